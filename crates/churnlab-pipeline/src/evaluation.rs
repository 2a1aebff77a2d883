//! Evaluation metrics: accuracy, confusion matrix, per-class report.
//!
//! Pure functions of (predictions, truth); re-running on the same inputs
//! yields identical results.
use ndarray::Array2;

use crate::error::PipelineError;

/// Precision/recall/F1 for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: i32,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    /// Rows of this class in the truth labels.
    pub support: usize,
}

/// One model's held-out evaluation. Immutable once computed.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub accuracy: f32,
    /// Distinct labels in ascending order; indexes both confusion axes.
    pub labels: Vec<i32>,
    /// Counts of actual (rows) x predicted (columns).
    pub confusion: Array2<usize>,
    pub per_class: Vec<ClassMetrics>,
}

/// Compute accuracy, confusion matrix, and per-class metrics.
pub fn evaluate(predictions: &[i32], truth: &[i32]) -> Result<Evaluation, PipelineError> {
    if predictions.len() != truth.len() {
        return Err(PipelineError::Shape(format!(
            "predictions ({}) and truth ({}) differ",
            predictions.len(),
            truth.len()
        )));
    }
    if truth.is_empty() {
        return Err(PipelineError::Shape(
            "cannot evaluate an empty test partition".to_string(),
        ));
    }

    let mut labels: Vec<i32> = truth.iter().chain(predictions).copied().collect();
    labels.sort_unstable();
    labels.dedup();

    let index_of = |label: i32| labels.binary_search(&label).expect("label set is exhaustive");

    let k = labels.len();
    let mut confusion = Array2::zeros((k, k));
    let mut correct = 0usize;
    for (&predicted, &actual) in predictions.iter().zip(truth) {
        confusion[(index_of(actual), index_of(predicted))] += 1;
        if predicted == actual {
            correct += 1;
        }
    }

    let accuracy = correct as f32 / truth.len() as f32;

    let per_class = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let tp = confusion[(i, i)];
            let actual_total: usize = (0..k).map(|j| confusion[(i, j)]).sum();
            let predicted_total: usize = (0..k).map(|j| confusion[(j, i)]).sum();

            let precision = ratio(tp, predicted_total);
            let recall = ratio(tp, actual_total);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassMetrics {
                label,
                precision,
                recall,
                f1,
                support: actual_total,
            }
        })
        .collect();

    Ok(Evaluation {
        accuracy,
        labels,
        confusion,
        per_class,
    })
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

/// Text classification report, one row per class plus accuracy.
///
/// `class_names` must align with `evaluation.labels`.
pub fn classification_report(evaluation: &Evaluation, class_names: &[String]) -> String {
    debug_assert_eq!(class_names.len(), evaluation.labels.len());

    let name_width = class_names
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(0)
        .max("accuracy".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:>width$}  precision  recall  f1-score  support\n",
        "",
        width = name_width
    ));
    for (metrics, name) in evaluation.per_class.iter().zip(class_names) {
        out.push_str(&format!(
            "{:>width$}  {:>9.2}  {:>6.2}  {:>8.2}  {:>7}\n",
            name,
            metrics.precision,
            metrics.recall,
            metrics.f1,
            metrics.support,
            width = name_width
        ));
    }
    let total: usize = evaluation.per_class.iter().map(|m| m.support).sum();
    out.push_str(&format!(
        "{:>width$}  {:>9}  {:>6}  {:>8.2}  {:>7}\n",
        "accuracy",
        "",
        "",
        evaluation.accuracy,
        total,
        width = name_width
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let truth = vec![0, 1, 0, 1];
        let eval = evaluate(&truth, &truth).unwrap();
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.confusion[(0, 0)], 2);
        assert_eq!(eval.confusion[(1, 1)], 2);
        assert_eq!(eval.confusion[(0, 1)], 0);
        for metrics in &eval.per_class {
            assert_eq!(metrics.precision, 1.0);
            assert_eq!(metrics.recall, 1.0);
            assert_eq!(metrics.f1, 1.0);
        }
    }

    #[test]
    fn confusion_counts_off_diagonal() {
        let truth = vec![0, 0, 1, 1];
        let predictions = vec![0, 1, 1, 0];
        let eval = evaluate(&predictions, &truth).unwrap();
        assert_eq!(eval.accuracy, 0.5);
        assert_eq!(eval.confusion[(0, 1)], 1);
        assert_eq!(eval.confusion[(1, 0)], 1);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(evaluate(&[0, 1], &[0]).is_err());
    }
}
