//! `emailValidation`: the field must be text in the usual `local@domain.tld`
//! shape. Failures are recorded under the rule key `emailFormat`.

use regex::Regex;
use serde_json::Value;

use sa_core::{EngineError, FieldValue};
use sa_engine::{RuleContext, Validator};

use crate::error::RulesError;

pub const EMAIL: &str = "emailValidation";

/// Rule key of email findings.
pub const EMAIL_FORMAT: &str = "emailFormat";

const EMAIL_PATTERN: &str = r#"(?i)^(([^<>()\[\].,;:\s@"]+(\.[^<>()\[\].,;:\s@"]+)*)|(".+"))@(([^<>()\[\].,;:\s@"]+\.)+[^<>()\[\].,;:\s@"]{2,})$"#;

#[derive(Debug, Clone)]
pub struct EmailValidator {
    pattern: Regex,
}

impl EmailValidator {
    pub fn new() -> Result<Self, RulesError> {
        Ok(Self {
            pattern: Regex::new(EMAIL_PATTERN)?,
        })
    }

    /// Whether `text` has email shape.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl Validator for EmailValidator {
    fn annotation_name(&self) -> &str {
        EMAIL
    }

    fn validate(&self, _: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let valid = ctx
            .value(path)
            .and_then(FieldValue::as_str)
            .is_some_and(|text| !text.is_empty() && self.is_match(text));
        ctx.record(path, EMAIL_FORMAT, !valid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_with;
    use sa_engine::{Annotation, RuleHandler, ShadowNode};
    use serde_json::json;

    #[test]
    fn accepts_common_shapes() {
        let email = EmailValidator::new().unwrap();
        assert!(email.is_match("a@b.com"));
        assert!(email.is_match("first.last@mail.example.org"));
        assert!(email.is_match("\"quoted name\"@example.sk"));
        assert!(email.is_match("A@B.COM"));
    }

    #[test]
    fn rejects_malformed() {
        let email = EmailValidator::new().unwrap();
        assert!(!email.is_match("not-an-email"));
        assert!(!email.is_match(""));
        assert!(!email.is_match("a@b"));
        assert!(!email.is_match("a@b.c"));
        assert!(!email.is_match("a b@c.com"));
        assert!(!email.is_match(".a@b.com"));
    }

    #[test]
    fn findings_use_email_format_key() {
        let validator = EmailValidator::new().unwrap();
        let mut session = session_with([RuleHandler::validator(validator)]);
        let shadow = ShadowNode::new().annotate("email", [Annotation::validator(EMAIL)]);
        let data = FieldValue::from(json!({"email": "not-an-email"}));
        let mut obj = session.register("user", data, shadow).unwrap();

        session.dispatch(&mut obj, "email").unwrap();
        assert!(session.findings().contains("email", EMAIL_FORMAT));

        *obj.data_mut() = FieldValue::from(json!({"email": ""}));
        session.dispatch(&mut obj, "email").unwrap();
        assert_eq!(session.findings().len(), 1);

        *obj.data_mut() = FieldValue::from(json!({"email": "a@b.com"}));
        session.dispatch(&mut obj, "email").unwrap();
        assert!(session.findings().is_empty());
    }

    #[test]
    fn non_text_fails() {
        let validator = EmailValidator::new().unwrap();
        let mut session = session_with([RuleHandler::validator(validator)]);
        let shadow = ShadowNode::new().annotate("email", [Annotation::validator(EMAIL)]);
        let data = FieldValue::from(json!({"email": 42}));
        let mut obj = session.register("user", data, shadow).unwrap();
        session.dispatch(&mut obj, "email").unwrap();
        assert!(session.findings().contains("email", EMAIL_FORMAT));
    }
}
