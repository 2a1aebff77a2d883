use ndarray::Array2;

use crate::error::PipelineError;

/// Common capability set shared by every classifier in the bank.
///
/// All four variants fit once on scaled training data; none supports
/// incremental fitting. Probabilities refer to the positive class (label 1).
pub trait ClassifierModel {
    /// Fit the model on binary labels (0 / 1).
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError>;

    /// Predict a class label per row.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, PipelineError>;

    /// Predict the positive-class probability per row, in [0, 1].
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError>;

    /// Stable name used as the bank key.
    fn name(&self) -> &'static str;

    /// Per-feature importance scores (non-negative, summing to 1), when the
    /// model kind supports them.
    fn feature_importances(&self) -> Option<Vec<f32>> {
        None
    }
}
