//! Preprocessing: column dropping, numeric coercion, label encoding, and
//! the standard scaler.
//!
//! Operations run in a fixed order (identifier drop, coercion, missing-row
//! removal, encoding); later steps assume the earlier ones completed. The
//! fitted vocabularies and scaler statistics are retained in the pipeline
//! state and reused verbatim at prediction time.
use std::collections::HashMap;

use ndarray::{Array1, Array2};

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::error::PipelineError;

/// Ordered, bijective mapping between category text and integer codes.
///
/// Encoding is only defined for values present at fit time; unseen values
/// must fail loudly rather than default to a code.
#[derive(Debug, Clone)]
pub struct CategoryVocabulary {
    categories: Vec<String>,
    codes: HashMap<String, usize>,
}

impl CategoryVocabulary {
    /// Fit from values in first-encounter order.
    pub fn fit<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Self {
        let mut vocab = CategoryVocabulary {
            categories: Vec::new(),
            codes: HashMap::new(),
        };
        for value in values {
            if !vocab.codes.contains_key(value) {
                vocab.codes.insert(value.to_string(), vocab.categories.len());
                vocab.categories.push(value.to_string());
            }
        }
        vocab
    }

    /// Fit from sorted distinct values. Used for the target column so the
    /// label/code mapping does not depend on input row order.
    pub fn fit_sorted<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Self {
        let mut distinct: Vec<&str> = values.into_iter().collect();
        distinct.sort_unstable();
        distinct.dedup();
        Self::fit(distinct)
    }

    pub fn encode(&self, value: &str) -> Option<usize> {
        self.codes.get(value).copied()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.categories.get(code).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in code order, for dropdown-style selection.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

/// Output of [`preprocess`]: a fully numeric feature matrix, the encoded
/// target, and everything the predictor needs to re-apply the encodings.
#[derive(Debug)]
pub struct Preprocessed {
    pub x: Array2<f32>,
    pub y: Array1<i32>,
    /// Feature columns in training order (target excluded).
    pub feature_names: Vec<String>,
    /// Per-column vocabularies for originally-categorical feature columns.
    pub vocabularies: HashMap<String, CategoryVocabulary>,
    pub target_vocabulary: CategoryVocabulary,
    /// Rows removed because a coerce column held an unparseable value.
    pub dropped_rows: usize,
}

/// Run the fixed preprocessing sequence over a loaded dataset.
pub fn preprocess(
    mut dataset: Dataset,
    config: &PipelineConfig,
) -> Result<Preprocessed, PipelineError> {
    // 1. Identifier columns carry no signal and would be spuriously encoded.
    for name in &config.drop_columns {
        if let Some(idx) = dataset.column_index(name) {
            log::debug!("Dropping identifier column '{}'", name);
            dataset.drop_column(idx);
        }
    }

    // 2-3. Coerce the configured text-numeric columns and drop any row
    // where coercion fails. No imputation.
    let coerce_indices: Vec<usize> = config
        .coerce_columns
        .iter()
        .filter_map(|name| dataset.column_index(name))
        .collect();

    let before = dataset.n_rows();
    if !coerce_indices.is_empty() {
        dataset.rows.retain(|row| {
            coerce_indices
                .iter()
                .all(|&idx| row[idx].trim().parse::<f32>().is_ok())
        });
    }
    let dropped_rows = before - dataset.n_rows();
    if dropped_rows > 0 {
        log::warn!(
            "Dropped {} of {} rows with unparseable values in coerce columns",
            dropped_rows,
            before
        );
    }
    if dataset.n_rows() == 0 {
        return Err(PipelineError::InsufficientData(
            "all rows dropped during numeric coercion".to_string(),
        ));
    }

    let target_idx = dataset
        .column_index(&config.target_column)
        .ok_or_else(|| PipelineError::SchemaMismatch {
            column: config.target_column.clone(),
        })?;

    // 4. Encode the target from sorted distinct values so the binary code
    // assignment is stable across row orderings.
    let target_vocabulary =
        CategoryVocabulary::fit_sorted(dataset.rows.iter().map(|row| row[target_idx].trim()));
    if target_vocabulary.len() != 2 {
        return Err(PipelineError::InsufficientData(format!(
            "target column '{}' must have exactly 2 classes, found {}",
            config.target_column,
            target_vocabulary.len()
        )));
    }

    let y: Array1<i32> = dataset
        .rows
        .iter()
        .map(|row| {
            target_vocabulary
                .encode(row[target_idx].trim())
                .expect("target vocabulary was fit over these exact rows") as i32
        })
        .collect();

    // Encode categorical feature columns in first-encounter order; numeric
    // columns (every value parses) pass through unchanged.
    let mut feature_names = Vec::new();
    let mut vocabularies = HashMap::new();
    let mut columns: Vec<Vec<f32>> = Vec::new();

    for (col_idx, name) in dataset.columns.iter().enumerate() {
        if col_idx == target_idx {
            continue;
        }
        let is_numeric = dataset
            .rows
            .iter()
            .all(|row| row[col_idx].trim().parse::<f32>().is_ok());

        let values: Vec<f32> = if is_numeric {
            dataset
                .rows
                .iter()
                .map(|row| {
                    row[col_idx]
                        .trim()
                        .parse::<f32>()
                        .expect("column was checked to be fully numeric")
                })
                .collect()
        } else {
            let vocab =
                CategoryVocabulary::fit(dataset.rows.iter().map(|row| row[col_idx].trim()));
            let encoded = dataset
                .rows
                .iter()
                .map(|row| {
                    vocab
                        .encode(row[col_idx].trim())
                        .expect("vocabulary was fit over these exact rows")
                        as f32
                })
                .collect();
            vocabularies.insert(name.clone(), vocab);
            encoded
        };

        feature_names.push(name.clone());
        columns.push(values);
    }

    if feature_names.is_empty() {
        return Err(PipelineError::InsufficientData(
            "no feature columns left after preprocessing".to_string(),
        ));
    }

    let n_rows = dataset.n_rows();
    let n_features = feature_names.len();
    let mut data = Vec::with_capacity(n_rows * n_features);
    for row in 0..n_rows {
        for column in &columns {
            data.push(column[row]);
        }
    }
    let x = Array2::from_shape_vec((n_rows, n_features), data)
        .map_err(|e| PipelineError::Shape(e.to_string()))?;

    log::info!(
        "Preprocessed {} rows into {} features ({} categorical)",
        n_rows,
        n_features,
        vocabularies.len()
    );

    Ok(Preprocessed {
        x,
        y,
        feature_names,
        vocabularies,
        target_vocabulary,
        dropped_rows,
    })
}

/// Per-column standard scaler (subtract mean, divide by stddev).
///
/// Fit once on the training partition; the stored statistics are reused for
/// the test partition and every prediction row, never refit.
#[derive(Debug, Clone)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f32 = 1e-6;

    /// Fit scaler statistics from a matrix of training rows.
    pub fn fit(x: &Array2<f32>) -> Result<Self, PipelineError> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 || ncols == 0 {
            return Err(PipelineError::Shape(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let nrows_f = nrows as f32;
        let mut mean = vec![0.0f32; ncols];
        for row in x.rows() {
            for (c, value) in row.iter().enumerate() {
                mean[c] += value;
            }
        }
        for v in mean.iter_mut() {
            *v /= nrows_f;
        }

        let mut std = vec![0.0f32; ncols];
        for row in x.rows() {
            for (c, value) in row.iter().enumerate() {
                let d = value - mean[c];
                std[c] += d * d;
            }
        }
        for v in std.iter_mut() {
            *v = (*v / nrows_f).sqrt().max(Self::MIN_STD);
        }

        Ok(Scaler { mean, std })
    }

    /// Transform all rows using the stored statistics.
    pub fn transform(&self, x: &Array2<f32>) -> Result<Array2<f32>, PipelineError> {
        let (nrows, ncols) = x.dim();
        if ncols != self.mean.len() {
            return Err(PipelineError::Shape(format!(
                "scaler fit on {} columns, got {}",
                self.mean.len(),
                ncols
            )));
        }
        let mut out = Vec::with_capacity(nrows * ncols);
        for row in x.rows() {
            for (c, value) in row.iter().enumerate() {
                out.push((value - self.mean[c]) / self.std[c]);
            }
        }
        Array2::from_shape_vec((nrows, ncols), out)
            .map_err(|e| PipelineError::Shape(e.to_string()))
    }

    /// Transform a single feature row.
    pub fn transform_row(&self, row: &[f32]) -> Result<Vec<f32>, PipelineError> {
        if row.len() != self.mean.len() {
            return Err(PipelineError::Shape(format!(
                "scaler fit on {} columns, got {}",
                self.mean.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(c, value)| (value - self.mean[c]) / self.std[c])
            .collect())
    }
}
