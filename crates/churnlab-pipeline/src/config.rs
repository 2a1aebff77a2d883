use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Central configuration for one pipeline run.
///
/// Column names default to the Telco churn dataset; override them for other
/// schemas. Unknown fields in a JSON config are rejected by serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Column holding the binary churn label.
    pub target_column: String,
    /// Unique-identifier columns dropped before training.
    pub drop_columns: Vec<String>,
    /// Logically numeric columns stored as text; coerced, with
    /// uncoercible values marking the row for removal.
    pub coerce_columns: Vec<String>,
    /// Fraction of rows held out for testing.
    pub test_fraction: f32,
    /// Seed for the stratified split.
    pub seed: u64,
    /// The model bank, trained in order.
    pub models: Vec<ModelType>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: "Churn".to_string(),
            drop_columns: vec!["customerID".to_string()],
            coerce_columns: vec!["TotalCharges".to_string()],
            test_fraction: 0.2,
            seed: 42,
            models: vec![
                ModelType::default_logistic_regression(),
                ModelType::default_decision_tree(),
                ModelType::default_random_forest(),
                ModelType::default_knn(),
            ],
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
        Ok(config)
    }
}

/// Supported classifier variants and their hyper-parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LogisticRegression {
        learning_rate: f32,
        epochs: usize,
        l2: f32,
    },
    DecisionTree {
        max_depth: usize,
        min_samples_split: usize,
    },
    RandomForest {
        n_trees: usize,
        max_depth: usize,
        min_samples_split: usize,
        seed: u64,
    },
    Knn {
        k: usize,
    },
}

impl ModelType {
    pub fn default_logistic_regression() -> Self {
        ModelType::LogisticRegression {
            learning_rate: 0.1,
            epochs: 500,
            l2: 1e-4,
        }
    }

    pub fn default_decision_tree() -> Self {
        ModelType::DecisionTree {
            max_depth: 8,
            min_samples_split: 2,
        }
    }

    pub fn default_random_forest() -> Self {
        ModelType::RandomForest {
            n_trees: 100,
            max_depth: 8,
            min_samples_split: 2,
            seed: 42,
        }
    }

    pub fn default_knn() -> Self {
        ModelType::Knn { k: 5 }
    }

    /// Stable key used to select a model in the bank.
    pub fn key(&self) -> &'static str {
        match self {
            ModelType::LogisticRegression { .. } => "logistic_regression",
            ModelType::DecisionTree { .. } => "decision_tree",
            ModelType::RandomForest { .. } => "random_forest",
            ModelType::Knn { .. } => "knn",
        }
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::default_random_forest()
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic_regression" => Ok(ModelType::default_logistic_regression()),
            "decision_tree" => Ok(ModelType::default_decision_tree()),
            "random_forest" => Ok(ModelType::default_random_forest()),
            "knn" => Ok(ModelType::default_knn()),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of logistic_regression, \
                 decision_tree, random_forest, knn",
                s
            )),
        }
    }
}
