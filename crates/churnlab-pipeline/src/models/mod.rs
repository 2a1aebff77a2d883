//! The model bank: four in-crate classifier variants behind one trait.
pub mod classifier_trait;
pub mod factory;
pub mod forest;
pub mod knn;
pub mod logistic;
pub mod tree;

pub use classifier_trait::ClassifierModel;
pub use factory::build_model;

use ndarray::Array2;

use crate::error::PipelineError;

/// Shared fit-input validation: paired lengths, binary labels, and both
/// classes present (a single-class training set is a degenerate fit).
pub(crate) fn validate_fit_input(x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError> {
    if x.nrows() != y.len() {
        return Err(PipelineError::Shape(format!(
            "feature rows ({}) and labels ({}) differ",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 {
        return Err(PipelineError::Training("empty training set".to_string()));
    }
    if y.iter().any(|&v| v != 0 && v != 1) {
        return Err(PipelineError::Training(
            "labels must be binary (0 or 1)".to_string(),
        ));
    }
    if !y.contains(&0) || !y.contains(&1) {
        return Err(PipelineError::Training(
            "training set contains a single class".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn not_fitted(name: &str) -> PipelineError {
    PipelineError::Training(format!("model '{}' has not been fitted", name))
}
