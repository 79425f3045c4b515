//! # Custom Syntax Tests
//!
//! A session configured from YAML with a non-default annotation syntax,
//! driven end to end through the public API with application-defined
//! handlers.

use std::sync::Arc;

use sa_core::{EngineError, FieldValue};
use sa_engine::{
    EngineConfig, FieldChange, HandlerTable, Processor, RuleContext, RuleHandler, RuleKind,
    Session, ShadowNode, Validator,
};
use serde_json::{json, Value};

const CONFIG: &str = r#"
syntax:
  reserved_prefix: "@"
  validation_suffix: Check
  conversion_suffix: Codec
max_cascade_depth: 8
"#;

/// Fails when the text is shorter than the configured minimum.
struct MinLength;

impl Validator for MinLength {
    fn annotation_name(&self) -> &str {
        "minLengthCheck"
    }

    fn validate(&self, config: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let min = config.get("min").and_then(Value::as_u64).unwrap_or(1) as usize;
        let short = ctx
            .value(path)
            .and_then(FieldValue::as_str)
            .map_or(true, |text| text.chars().count() < min);
        ctx.record(path, "minLengthCheck", short);
        Ok(())
    }
}

/// Keeps `initials` in sync with `first` and `last`.
struct Initials;

impl Processor for Initials {
    fn annotation_name(&self) -> &str {
        "initials"
    }

    fn process(&self, _: &Value, _: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let initials = initial(ctx, "first") + &initial(ctx, "last");
        ctx.set_value("initials", FieldValue::from(initials))?;
        Ok(())
    }
}

fn initial(ctx: &RuleContext<'_>, field: &str) -> String {
    ctx.value(field)
        .and_then(FieldValue::as_str)
        .and_then(|s| s.chars().next())
        .map(String::from)
        .unwrap_or_default()
}

fn session() -> Session {
    let mut table = HandlerTable::new();
    table.register(RuleHandler::validator(MinLength));
    table.register(RuleHandler::processor(Initials));
    let config = EngineConfig::from_yaml_str(CONFIG).unwrap();
    Session::new(config, Arc::new(table)).unwrap()
}

fn shadow(session: &Session) -> ShadowNode {
    ShadowNode::from_json(
        &json!({
            "@first": {"minLengthCheck": {"min": 2}, "initials": {}},
            "@last": {"minLengthCheck": {"min": 2}, "initials": {}},
            "@zip": {"postalCodec": {}}
        }),
        &session.config().syntax,
    )
    .unwrap()
}

#[test]
fn custom_suffixes_classify_rules() {
    let session = session();
    let shadow = shadow(&session);
    let kinds: Vec<RuleKind> = shadow
        .annotations("first")
        .unwrap()
        .iter()
        .map(|a| a.kind())
        .collect();
    assert_eq!(kinds, vec![RuleKind::Validator, RuleKind::Processor]);
    assert_eq!(
        shadow.annotations("zip").unwrap().iter().next().map(|a| a.kind()),
        Some(RuleKind::Converter)
    );
}

#[test]
fn link_then_edit() {
    let mut session = session();
    let shadow = shadow(&session);
    let data = FieldValue::from(json!({"first": "J", "last": "Doe", "zip": "81101"}));
    let mut obj = session.link("person", data, shadow).unwrap();

    assert!(session.findings().contains("first", "minLengthCheck"));
    assert_eq!(obj.get("initials"), Some(&FieldValue::from("JD")));

    let change = session
        .set_field(&mut obj, "first", FieldValue::from("Jane"))
        .unwrap();
    assert_eq!(change, FieldChange::Dispatched);
    assert!(session.findings().is_empty());
    assert_eq!(obj.get("initials"), Some(&FieldValue::from("JD")));

    session
        .set_field(&mut obj, "last", FieldValue::from("Roe"))
        .unwrap();
    assert_eq!(obj.get("initials"), Some(&FieldValue::from("JR")));
}

#[test]
fn default_prefix_is_plain_shape_under_custom_syntax() {
    let session = session();
    let err = ShadowNode::from_json(
        &json!({"sa$first": {"minLengthCheck": {}}, "first": 1}),
        &session.config().syntax,
    )
    .unwrap_err();
    assert!(err.to_string().contains("first"));
}
