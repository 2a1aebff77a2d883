//! The training pipeline orchestrator and the single-row predictor.
//!
//! One call to [`train_pipeline`] runs load-to-evaluate synchronously and
//! returns an explicit [`PipelineState`] holding everything later queries
//! need: vocabularies, the fitted scaler, the trained model bank, and the
//! evaluation results. There is no global state; callers own the value and
//! may keep one per session.
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use ndarray::Array2;

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::error::PipelineError;
use crate::evaluation::{evaluate, Evaluation};
use crate::models::{build_model, ClassifierModel};
use crate::preprocessing::{preprocess, CategoryVocabulary, Scaler};
use crate::split::stratified_split;

/// One trained model's held-out results.
#[derive(Debug)]
pub struct ModelSummary {
    pub name: String,
    pub evaluation: Evaluation,
    pub train_seconds: f64,
}

/// Answer to one prediction query.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Decoded target label, e.g. "Yes" / "No".
    pub label: String,
    /// Positive-class probability as a percentage, rounded to 2 decimals.
    pub probability_pct: f32,
}

/// Everything produced by one training run.
///
/// Written exactly once by [`train_pipeline`] and read-only afterwards;
/// prediction queries borrow it immutably and may be retried after
/// query-scoped errors.
pub struct PipelineState {
    feature_names: Vec<String>,
    vocabularies: HashMap<String, CategoryVocabulary>,
    target_vocabulary: CategoryVocabulary,
    scaler: Scaler,
    bank: BTreeMap<String, Box<dyn ClassifierModel>>,
    summaries: Vec<ModelSummary>,
    class_balance: Vec<(String, usize)>,
    preview_columns: Vec<String>,
    preview: Vec<Vec<String>>,
    dropped_rows: usize,
}

/// Run the full pipeline: preprocess, split, scale, train every configured
/// model, and evaluate each on the held-out partition.
pub fn train_pipeline(
    dataset: Dataset,
    config: &PipelineConfig,
) -> Result<PipelineState, PipelineError> {
    let preview_columns = dataset.columns.clone();
    let preview = dataset.head(5);
    let class_balance = dataset
        .column_index(&config.target_column)
        .map(|idx| dataset.value_counts(idx))
        .ok_or_else(|| PipelineError::SchemaMismatch {
            column: config.target_column.clone(),
        })?;

    log::info!(
        "Training pipeline on {} rows x {} columns",
        dataset.n_rows(),
        dataset.n_cols()
    );

    let pre = preprocess(dataset, config)?;
    let split = stratified_split(&pre.x, &pre.y, config.test_fraction, config.seed)?;

    // Scaling statistics come from the training partition only; the same
    // statistics transform the test partition and every prediction row.
    let scaler = Scaler::fit(&split.x_train)?;
    let x_train = scaler.transform(&split.x_train)?;
    let x_test = scaler.transform(&split.x_test)?;
    let y_train = split.y_train.to_vec();
    let y_test = split.y_test.to_vec();

    let mut bank: BTreeMap<String, Box<dyn ClassifierModel>> = BTreeMap::new();
    let mut summaries = Vec::with_capacity(config.models.len());

    for model_type in &config.models {
        let mut model = build_model(model_type);
        let name = model.name().to_string();

        let started = Instant::now();
        model.fit(&x_train, &y_train)?;
        let train_seconds = started.elapsed().as_secs_f64();

        let predictions = model.predict(&x_test)?;
        let evaluation = evaluate(&predictions, &y_test)?;
        log::info!(
            "Trained {} in {:.3}s, held-out accuracy {:.4}",
            name,
            train_seconds,
            evaluation.accuracy
        );

        if bank.insert(name.clone(), model).is_some() {
            log::warn!("Model '{}' configured twice; keeping the last fit", name);
        }
        summaries.push(ModelSummary {
            name,
            evaluation,
            train_seconds,
        });
    }

    Ok(PipelineState {
        feature_names: pre.feature_names,
        vocabularies: pre.vocabularies,
        target_vocabulary: pre.target_vocabulary,
        scaler,
        bank,
        summaries,
        class_balance,
        preview_columns,
        preview,
        dropped_rows: pre.dropped_rows,
    })
}

impl PipelineState {
    /// Bank keys in iteration order.
    pub fn model_names(&self) -> Vec<&str> {
        self.bank.keys().map(|k| k.as_str()).collect()
    }

    pub fn summaries(&self) -> &[ModelSummary] {
        &self.summaries
    }

    /// Feature columns in training order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Vocabulary for a categorical feature column, if it is one.
    pub fn vocabulary(&self, column: &str) -> Option<&CategoryVocabulary> {
        self.vocabularies.get(column)
    }

    pub fn target_vocabulary(&self) -> &CategoryVocabulary {
        &self.target_vocabulary
    }

    /// Training-set mean of a numeric feature, used as the default when a
    /// query leaves the field unspecified.
    pub fn numeric_default(&self, column: &str) -> Option<f32> {
        let idx = self.feature_names.iter().position(|name| name == column)?;
        if self.vocabularies.contains_key(column) {
            None
        } else {
            Some(self.scaler.mean[idx])
        }
    }

    /// Target label counts of the loaded dataset, sorted by label.
    pub fn class_balance(&self) -> &[(String, usize)] {
        &self.class_balance
    }

    /// Column names of the raw upload, for the preview table.
    pub fn preview_columns(&self) -> &[String] {
        &self.preview_columns
    }

    /// First rows of the raw upload, before preprocessing.
    pub fn preview(&self) -> &[Vec<String>] {
        &self.preview
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Decode evaluation labels through the target vocabulary.
    pub fn class_names(&self, evaluation: &Evaluation) -> Vec<String> {
        evaluation
            .labels
            .iter()
            .map(|&label| {
                self.target_vocabulary
                    .decode(label as usize)
                    .map(str::to_string)
                    .unwrap_or_else(|| label.to_string())
            })
            .collect()
    }

    /// Top-10 feature importances from the random forest, sorted ascending
    /// by score. Empty when the forest was not trained; no other model's
    /// importances are substituted.
    pub fn rank_features(&self) -> Vec<(String, f32)> {
        let importances = self
            .bank
            .get("random_forest")
            .and_then(|model| model.feature_importances());

        let Some(importances) = importances else {
            return Vec::new();
        };

        let mut ranked: Vec<(String, f32)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(importances)
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(10);
        ranked.reverse();
        ranked
    }

    /// Answer one prediction query against a chosen model.
    ///
    /// The input supplies one raw string value per original feature column.
    /// Categorical values must come from the fitted vocabulary; numeric
    /// columns may be omitted to fall back to the training-set mean.
    pub fn predict(
        &self,
        model_name: &str,
        input: &HashMap<String, String>,
    ) -> Result<Prediction, PipelineError> {
        let model = self
            .bank
            .get(model_name)
            .ok_or_else(|| PipelineError::UnknownModel(model_name.to_string()))?;

        let mut row = Vec::with_capacity(self.feature_names.len());
        for (idx, name) in self.feature_names.iter().enumerate() {
            let supplied = input.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

            let value = match self.vocabularies.get(name) {
                Some(vocab) => {
                    let raw = supplied.ok_or_else(|| PipelineError::SchemaMismatch {
                        column: name.clone(),
                    })?;
                    vocab.encode(raw).ok_or_else(|| PipelineError::Encoding {
                        column: name.clone(),
                        value: raw.to_string(),
                    })? as f32
                }
                None => match supplied {
                    Some(raw) => raw.parse::<f32>().map_err(|_| {
                        PipelineError::Parse(format!(
                            "column '{}': '{}' is not numeric",
                            name, raw
                        ))
                    })?,
                    None => self.scaler.mean[idx],
                },
            };
            row.push(value);
        }

        let scaled = self.scaler.transform_row(&row)?;
        let x = Array2::from_shape_vec((1, scaled.len()), scaled)
            .map_err(|e| PipelineError::Shape(e.to_string()))?;

        let label_code = model.predict(&x)?[0];
        let p_positive = model.predict_proba(&x)?[0];

        let label = self
            .target_vocabulary
            .decode(label_code as usize)
            .map(str::to_string)
            .unwrap_or_else(|| label_code.to_string());

        Ok(Prediction {
            label,
            probability_pct: (p_positive * 10_000.0).round() / 100.0,
        })
    }
}
