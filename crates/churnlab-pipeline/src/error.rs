use std::error::Error;
use std::fmt;

/// Errors raised by the training pipeline and the predictor.
///
/// Pipeline-stage errors (parse, insufficient data, training) abort the
/// current run; predictor-stage errors (encoding, unknown model, schema
/// mismatch) are scoped to a single query and leave the trained state
/// usable for a retry.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Malformed CSV upload or an unparseable numeric value.
    Parse(String),
    /// A categorical value absent from the fitted vocabulary.
    Encoding { column: String, value: String },
    /// Too few rows in some class to stratify the split.
    InsufficientData(String),
    /// Degenerate fit input (e.g. a single-class training set).
    Training(String),
    /// Prediction requested for a model name not in the bank.
    UnknownModel(String),
    /// Prediction input is missing an expected feature column.
    SchemaMismatch { column: String },
    /// Mismatched array dimensions between paired inputs.
    Shape(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Parse(msg) => write!(f, "parse error: {}", msg),
            PipelineError::Encoding { column, value } => write!(
                f,
                "unseen category '{}' for column '{}'",
                value, column
            ),
            PipelineError::InsufficientData(msg) => {
                write!(f, "insufficient data: {}", msg)
            }
            PipelineError::Training(msg) => write!(f, "training failed: {}", msg),
            PipelineError::UnknownModel(name) => {
                write!(f, "unknown model '{}'", name)
            }
            PipelineError::SchemaMismatch { column } => {
                write!(f, "missing expected feature column '{}'", column)
            }
            PipelineError::Shape(msg) => write!(f, "shape mismatch: {}", msg),
        }
    }
}

impl Error for PipelineError {}
