//! # Document Round-Trip Tests
//!
//! Drives the subcommand functions against the person demo documents and
//! temporary files.

use std::path::{Path, PathBuf};

use sa_cli::check::{check_shadow, CheckArgs};
use sa_cli::convert::{convert_document, run_convert, ConvertArgs, ConvertDirection};
use sa_cli::validate::{run_validate, validate_document, ValidateArgs};
use sa_core::FieldValue;

fn demo(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/person")
        .join(file)
}

fn validate_args() -> ValidateArgs {
    ValidateArgs {
        data: demo("user.json"),
        shadow: demo("user.shadow.json"),
        key: "user".to_string(),
        cities: Some(demo("cities.yaml")),
        json: false,
    }
}

#[test]
fn validate_reports_person_findings() {
    let report = validate_document(&validate_args(), Some(&demo("engine.yaml"))).unwrap();
    assert_eq!(report.key, "user");
    assert_eq!(report.errors, 12);
    assert!(!report.passed());
    assert_eq!(report.by_property[0].property, "email");
    assert_eq!(report.by_property[0].count, 2);
    assert_eq!(run_validate(&validate_args(), None).unwrap(), 1);
}

#[test]
fn validate_passes_complete_document() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("user.yaml");
    let shadow = dir.path().join("user.shadow.yaml");
    std::fs::write(&data, "name: Pablo\nemail: pablo@example.com\n").unwrap();
    std::fs::write(
        &shadow,
        "sa$name: {notEmptyValidation: {}}\nsa$email: {notEmptyValidation: {}, emailValidation: {}}\n",
    )
    .unwrap();

    let args = ValidateArgs {
        data,
        shadow,
        key: "user".to_string(),
        cities: None,
        json: true,
    };
    let report = validate_document(&args, None).unwrap();
    assert!(report.findings.is_empty());
    assert_eq!(run_validate(&args, None).unwrap(), 0);
}

#[test]
fn validate_without_binding_on_link_still_validates() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("engine.yaml");
    std::fs::write(&config, "enable_binding_on_link: false\n").unwrap();
    let report = validate_document(&validate_args(), Some(&config)).unwrap();
    assert_eq!(report.errors, 12);
}

#[test]
fn convert_to_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let rich = dir.path().join("rich.json");

    let to = ConvertArgs {
        data: demo("user.json"),
        shadow: demo("user.shadow.json"),
        direction: ConvertDirection::To,
        out: Some(rich.clone()),
    };
    assert_eq!(run_convert(&to, None).unwrap(), 0);
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&rich).unwrap()).unwrap();
    assert_eq!(written["address"]["note"]["number2"], serde_json::json!("0.9999"));

    let from = ConvertArgs {
        data: rich,
        shadow: demo("user.shadow.json"),
        direction: ConvertDirection::From,
        out: None,
    };
    let plain = convert_document(&from, None).unwrap();
    assert_eq!(
        sa_core::path::resolve(&plain, "address.note.number2"),
        Some(&FieldValue::Number(0.9999))
    );
}

#[test]
fn check_shadow_lists_unregistered_rules_and_gaps() {
    let args = CheckArgs {
        shadow: demo("user.shadow.json"),
        data: Some(demo("user.json")),
        strict: true,
    };
    let report = check_shadow(&args, None).unwrap();
    assert_eq!(report.depth, 4);

    let unregistered: Vec<(&str, &str)> = report
        .unregistered
        .iter()
        .map(|(k, n)| (k.as_str(), n.as_str()))
        .collect();
    assert_eq!(
        unregistered,
        vec![
            ("converter", "arrayConversion"),
            ("validator", "itemsValidation"),
            ("validator", "noteValidation"),
        ]
    );
    assert!(report.coverage_gaps.contains(&"total".to_string()));
    assert!(report.coverage_gaps.contains(&"geek".to_string()));
    assert!(!report.is_clean());
}

#[test]
fn check_shadow_rejects_malformed_tree() {
    let dir = tempfile::tempdir().unwrap();
    let shadow = dir.path().join("bad.json");
    std::fs::write(&shadow, r#"{"address": 5}"#).unwrap();
    let args = CheckArgs {
        shadow,
        data: None,
        strict: false,
    };
    let err = check_shadow(&args, None).unwrap_err();
    assert!(format!("{err:#}").contains("address"));
}
