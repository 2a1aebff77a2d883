//! Tests for CLI argument helpers and configuration loading.

use std::io::Write;
use std::str::FromStr;

use churnlab_cli::workbench::{load_config, parse_set_arg, validate_csv_file};
use churnlab_pipeline::config::{ModelType, PipelineConfig};

// ---------------------------------------------------------------------------
// CSV path validation
// ---------------------------------------------------------------------------

#[test]
fn accepts_an_existing_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subscribers.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();
    let validated = validate_csv_file(path.to_str().unwrap()).unwrap();
    assert_eq!(validated, path);
}

#[test]
fn rejects_a_missing_file() {
    assert!(validate_csv_file("/no/such/file.csv").is_err());
}

#[test]
fn rejects_a_non_csv_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subscribers.txt");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();
    assert!(validate_csv_file(path.to_str().unwrap()).is_err());
}

// ---------------------------------------------------------------------------
// --set parsing
// ---------------------------------------------------------------------------

#[test]
fn parses_column_value_pairs() {
    assert_eq!(
        parse_set_arg("plan_type=premium").unwrap(),
        ("plan_type".to_string(), "premium".to_string())
    );
    // Whitespace around both sides is trimmed.
    assert_eq!(
        parse_set_arg(" tenure_months = 12 ").unwrap(),
        ("tenure_months".to_string(), "12".to_string())
    );
    // Only the first '=' splits, so values may contain one.
    assert_eq!(
        parse_set_arg("note=a=b").unwrap(),
        ("note".to_string(), "a=b".to_string())
    );
}

#[test]
fn rejects_malformed_set_arguments() {
    assert!(parse_set_arg("plan_type").is_err());
    assert!(parse_set_arg("=premium").is_err());
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn defaults_match_the_telco_schema() {
    let config = PipelineConfig::default();
    assert_eq!(config.target_column, "Churn");
    assert_eq!(config.drop_columns, vec!["customerID"]);
    assert_eq!(config.coerce_columns, vec!["TotalCharges"]);
    assert_eq!(config.test_fraction, 0.2);
    assert_eq!(config.seed, 42);
    assert_eq!(config.models.len(), 4);
}

#[test]
fn no_config_path_falls_back_to_defaults() {
    let config = load_config(None).unwrap();
    assert_eq!(config.target_column, "Churn");
}

#[test]
fn loads_a_partial_json_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"target_column": "churn", "drop_columns": ["id"], "seed": 7}}"#
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.target_column, "churn");
    assert_eq!(config.drop_columns, vec!["id"]);
    assert_eq!(config.seed, 7);
    // Unspecified fields keep their defaults.
    assert_eq!(config.test_fraction, 0.2);
    assert_eq!(config.models.len(), 4);
}

#[test]
fn rejects_unknown_config_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"target_colunm": "churn"}}"#).unwrap();
    assert!(PipelineConfig::from_json_file(file.path()).is_err());
}

#[test]
fn config_survives_a_json_round_trip() {
    let config = PipelineConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let restored: PipelineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.target_column, config.target_column);
    assert_eq!(restored.seed, config.seed);
    assert_eq!(restored.models.len(), config.models.len());
}

#[test]
fn model_names_parse_to_their_default_variants() {
    for name in ["logistic_regression", "decision_tree", "random_forest", "knn"] {
        let model = ModelType::from_str(name).unwrap();
        assert_eq!(model.key(), name);
    }
    assert!(ModelType::from_str("gradient_boosting").is_err());
}
