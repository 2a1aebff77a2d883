//! Integration tests for stratified splitting and evaluation.

use churnlab_pipeline::error::PipelineError;
use churnlab_pipeline::evaluation::{classification_report, evaluate};
use churnlab_pipeline::split::stratified_split;
use ndarray::{Array1, Array2};

/// 100 rows, 80 of class 0 and 20 of class 1, one feature carrying the
/// row index so partitions can be traced back.
fn imbalanced_data() -> (Array2<f32>, Array1<i32>) {
    let x = Array2::from_shape_fn((100, 1), |(r, _)| r as f32);
    let y = Array1::from_shape_fn(100, |r| if r < 80 { 0 } else { 1 });
    (x, y)
}

// ---------------------------------------------------------------------------
// Stratified split
// ---------------------------------------------------------------------------

#[test]
fn split_preserves_class_proportions() {
    let (x, y) = imbalanced_data();
    let split = stratified_split(&x, &y, 0.2, 42).unwrap();

    assert_eq!(split.x_train.nrows(), 80);
    assert_eq!(split.x_test.nrows(), 20);

    let test_pos = split.y_test.iter().filter(|&&l| l == 1).count();
    let train_pos = split.y_train.iter().filter(|&&l| l == 1).count();
    // 20% of each class: 16 negatives and 4 positives in the test set.
    assert_eq!(test_pos, 4);
    assert_eq!(train_pos, 16);
}

#[test]
fn split_rows_and_labels_stay_paired() {
    let (x, y) = imbalanced_data();
    let split = stratified_split(&x, &y, 0.2, 7).unwrap();

    // The single feature is the original row index, so the label can be
    // recomputed from it.
    for (row, &label) in split.x_test.outer_iter().zip(split.y_test.iter()) {
        let original = row[0] as usize;
        assert_eq!(label, if original < 80 { 0 } else { 1 });
    }
    for (row, &label) in split.x_train.outer_iter().zip(split.y_train.iter()) {
        let original = row[0] as usize;
        assert_eq!(label, if original < 80 { 0 } else { 1 });
    }
}

#[test]
fn split_is_deterministic_for_a_seed() {
    let (x, y) = imbalanced_data();
    let a = stratified_split(&x, &y, 0.2, 42).unwrap();
    let b = stratified_split(&x, &y, 0.2, 42).unwrap();
    assert_eq!(a.y_test.to_vec(), b.y_test.to_vec());
    assert_eq!(a.x_test, b.x_test);

    let c = stratified_split(&x, &y, 0.2, 43).unwrap();
    assert_ne!(a.x_test, c.x_test);
}

#[test]
fn split_requires_two_rows_per_class() {
    let x = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
    let y = Array1::from_vec(vec![0, 0, 1]);
    assert!(matches!(
        stratified_split(&x, &y, 0.2, 42),
        Err(PipelineError::InsufficientData(_))
    ));
}

#[test]
fn split_rejects_out_of_range_fraction() {
    let (x, y) = imbalanced_data();
    assert!(stratified_split(&x, &y, 0.0, 42).is_err());
    assert!(stratified_split(&x, &y, 1.0, 42).is_err());
}

#[test]
fn split_keeps_both_classes_in_both_partitions() {
    // 10 rows of class 0, 2 of class 1; rounding must not empty either side.
    let x = Array2::from_shape_fn((12, 1), |(r, _)| r as f32);
    let y = Array1::from_shape_fn(12, |r| if r < 10 { 0 } else { 1 });
    let split = stratified_split(&x, &y, 0.2, 1).unwrap();
    assert!(split.y_train.iter().any(|&l| l == 1));
    assert!(split.y_test.iter().any(|&l| l == 1));
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[test]
fn evaluation_is_idempotent() {
    let truth = vec![0, 0, 1, 1, 1, 0];
    let predictions = vec![0, 1, 1, 1, 0, 0];
    let a = evaluate(&predictions, &truth).unwrap();
    let b = evaluate(&predictions, &truth).unwrap();
    assert_eq!(a.accuracy, b.accuracy);
    assert_eq!(a.confusion, b.confusion);
    assert_eq!(a.per_class, b.per_class);
}

#[test]
fn confusion_rows_are_actual_columns_predicted() {
    let truth = vec![0, 0, 0, 1];
    let predictions = vec![0, 1, 1, 1];
    let eval = evaluate(&predictions, &truth).unwrap();
    assert_eq!(eval.labels, vec![0, 1]);
    assert_eq!(eval.confusion[(0, 0)], 1); // actual 0 predicted 0
    assert_eq!(eval.confusion[(0, 1)], 2); // actual 0 predicted 1
    assert_eq!(eval.confusion[(1, 0)], 0);
    assert_eq!(eval.confusion[(1, 1)], 1);

    // precision(1) = 1/3, recall(1) = 1/1
    let pos = &eval.per_class[1];
    assert!((pos.precision - 1.0 / 3.0).abs() < 1e-6);
    assert_eq!(pos.recall, 1.0);
    assert_eq!(pos.support, 1);
}

#[test]
fn empty_test_partition_is_rejected() {
    assert!(matches!(
        evaluate(&[], &[]),
        Err(PipelineError::Shape(_))
    ));
}

#[test]
fn report_contains_every_class_name_and_accuracy() {
    let truth = vec![0, 0, 1, 1];
    let predictions = vec![0, 0, 1, 0];
    let eval = evaluate(&predictions, &truth).unwrap();
    let names = vec!["No".to_string(), "Yes".to_string()];
    let report = classification_report(&eval, &names);
    assert!(report.contains("No"));
    assert!(report.contains("Yes"));
    assert!(report.contains("accuracy"));
    assert!(report.contains("support"));
}
