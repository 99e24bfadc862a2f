//! # Configuration Tests
//!
//! Defaults, partial JSON documents, file loading and cross-field validation.

use std::io::Write;

use gatesim_core::config::Config;
use gatesim_core::{Circuit, SimError};
use tempfile::NamedTempFile;

#[test]
fn defaults_describe_a_zero_delay_model() {
    let config = Config::default();
    assert_eq!(config.timing.gate_delay, 0);
    assert_eq!(config.timing.register_delay, 0);
    assert_eq!(config.scheduler.arity, 4);
    assert!(!config.general.trace_actions);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_document_yields_defaults() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
}

#[test]
fn partial_sections_keep_their_other_defaults() {
    let config = Config::from_json(r#"{ "timing": { "memory_delay": 2 } }"#).unwrap();
    assert_eq!(config.timing.memory_delay, 2);
    assert_eq!(config.timing.gate_delay, 0);
    assert_eq!(config.scheduler, Config::default().scheduler);
}

#[test]
fn config_loads_from_a_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "general": {{ "wait_limit": 50 }}, "scheduler": {{ "arity": 8 }} }}"#
    )
    .unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.general.wait_limit, 50);
    assert_eq!(config.scheduler.arity, 8);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}

#[test]
fn malformed_json_is_reported() {
    let err = Config::from_json("{ timing: ").unwrap_err();
    assert!(matches!(err, SimError::Json(_)));
}

#[test]
fn validation_rejects_out_of_range_values() {
    for json in [
        r#"{ "scheduler": { "arity": 1 } }"#,
        r#"{ "scheduler": { "renormalize_delta": 0 } }"#,
        r#"{ "scheduler": { "renormalize_limit": 10, "renormalize_delta": 11 } }"#,
        r#"{ "scheduler": { "max_actions_per_tick": 0 } }"#,
        r#"{ "scheduler": { "max_notifications": 0 } }"#,
        r#"{ "general": { "wait_limit": 0 } }"#,
    ] {
        let err = Config::from_json(json).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)), "{json}");
    }
}

#[test]
fn circuit_refuses_an_invalid_config() {
    let mut config = Config::default();
    config.scheduler.arity = 0;
    assert!(matches!(Circuit::new(config), Err(SimError::InvalidConfig(_))));
}
