//! Seeded, class-stratified train/test splitting.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PipelineError;

/// Paired train/test partitions. Row order between features and labels is
/// preserved by construction and never reordered independently.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f32>,
    pub y_train: Array1<i32>,
    pub x_test: Array2<f32>,
    pub y_test: Array1<i32>,
}

/// Partition `(x, y)` with per-class sampling so each partition keeps the
/// overall class proportions within rounding tolerance.
///
/// Fails with `InsufficientData` when any class has fewer than 2 rows, since
/// both partitions must see every class.
pub fn stratified_split(
    x: &Array2<f32>,
    y: &Array1<i32>,
    test_fraction: f32,
    seed: u64,
) -> Result<Split, PipelineError> {
    if x.nrows() != y.len() {
        return Err(PipelineError::Shape(format!(
            "feature rows ({}) and labels ({}) differ",
            x.nrows(),
            y.len()
        )));
    }
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(PipelineError::InsufficientData(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut by_class: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in y.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();

    for (label, mut indices) in by_class {
        let n = indices.len();
        if n < 2 {
            return Err(PipelineError::InsufficientData(format!(
                "class {} has only {} row(s); at least 2 are required to stratify",
                label, n
            )));
        }
        indices.shuffle(&mut rng);

        // Round per class, but keep at least one row on each side.
        let n_test = ((n as f32 * test_fraction).round() as usize).clamp(1, n - 1);
        test_indices.extend_from_slice(&indices[..n_test]);
        train_indices.extend_from_slice(&indices[n_test..]);
    }

    // Deterministic row order within each partition.
    train_indices.sort_unstable();
    test_indices.sort_unstable();

    log::debug!(
        "Stratified split: {} train rows, {} test rows (test fraction {})",
        train_indices.len(),
        test_indices.len(),
        test_fraction
    );

    Ok(Split {
        x_train: x.select(Axis(0), &train_indices),
        y_train: y.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_test: y.select(Axis(0), &test_indices),
    })
}
