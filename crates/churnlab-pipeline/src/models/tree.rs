//! CART decision tree with Gini impurity.
//!
//! The tree grower is shared with the random forest, which passes a
//! per-node feature subsample and bootstrap row indices. Importances are
//! accumulated as impurity decrease weighted by node size.
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ModelType;
use crate::error::PipelineError;
use crate::models::{not_fitted, validate_fit_input, ClassifierModel};

/// Growth limits shared by the standalone tree and the forest's trees.
#[derive(Debug, Clone)]
pub(crate) struct TreeSettings {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features considered per split; `None` means all.
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf {
        p_positive: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub(crate) fn predict_row(&self, row: ArrayView1<'_, f32>) -> f32 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { p_positive } => return *p_positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// A grown tree plus its raw (unnormalized) importance accumulator.
pub(crate) struct FittedTree {
    pub root: Node,
    pub importances: Vec<f32>,
}

/// Grow a tree over `indices` (which may repeat rows under bootstrapping).
pub(crate) fn grow_tree(
    x: &Array2<f32>,
    y: &[i32],
    indices: &[usize],
    settings: &TreeSettings,
    rng: &mut StdRng,
) -> FittedTree {
    let mut importances = vec![0.0f32; x.ncols()];
    let root = grow_node(
        x,
        y,
        indices,
        settings,
        rng,
        0,
        indices.len() as f32,
        &mut importances,
    );
    FittedTree { root, importances }
}

fn positives(y: &[i32], indices: &[usize]) -> usize {
    indices.iter().filter(|&&i| y[i] == 1).count()
}

fn gini(n_positive: usize, n_total: usize) -> f32 {
    if n_total == 0 {
        return 0.0;
    }
    let p = n_positive as f32 / n_total as f32;
    2.0 * p * (1.0 - p)
}

fn leaf(y: &[i32], indices: &[usize]) -> Node {
    Node::Leaf {
        p_positive: positives(y, indices) as f32 / indices.len() as f32,
    }
}

#[allow(clippy::too_many_arguments)]
fn grow_node(
    x: &Array2<f32>,
    y: &[i32],
    indices: &[usize],
    settings: &TreeSettings,
    rng: &mut StdRng,
    depth: usize,
    n_root: f32,
    importances: &mut [f32],
) -> Node {
    let n = indices.len();
    let n_pos = positives(y, indices);
    let node_gini = gini(n_pos, n);

    let is_pure = n_pos == 0 || n_pos == n;
    if is_pure || depth >= settings.max_depth || n < settings.min_samples_split {
        return leaf(y, indices);
    }

    let candidates: Vec<usize> = match settings.max_features {
        Some(m) if m < x.ncols() => {
            rand::seq::index::sample(rng, x.ncols(), m).into_vec()
        }
        _ => (0..x.ncols()).collect(),
    };

    let mut best: Option<(usize, f32, f32)> = None; // (feature, threshold, decrease)
    for &feature in &candidates {
        if let Some((threshold, decrease)) = best_split(x, y, indices, feature, node_gini) {
            if best.map_or(true, |(_, _, best_dec)| decrease > best_dec) {
                best = Some((feature, threshold, decrease));
            }
        }
    }

    let Some((feature, threshold, decrease)) = best else {
        // Every candidate feature is constant over this node.
        return leaf(y, indices);
    };

    importances[feature] += (n as f32 / n_root) * decrease;

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[(i, feature)] <= threshold);

    let left = grow_node(
        x, y, &left_idx, settings, rng, depth + 1, n_root, importances,
    );
    let right = grow_node(
        x, y, &right_idx, settings, rng, depth + 1, n_root, importances,
    );

    Node::Split {
        feature,
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Best threshold for one feature, as (threshold, impurity decrease).
fn best_split(
    x: &Array2<f32>,
    y: &[i32],
    indices: &[usize],
    feature: usize,
    node_gini: f32,
) -> Option<(f32, f32)> {
    let mut ordered: Vec<(f32, i32)> = indices
        .iter()
        .map(|&i| (x[(i, feature)], y[i]))
        .collect();
    ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let n = ordered.len();
    let total_pos = ordered.iter().filter(|(_, label)| *label == 1).count();

    let mut best: Option<(f32, f32)> = None;
    let mut left_pos = 0usize;
    for i in 0..n - 1 {
        if ordered[i].1 == 1 {
            left_pos += 1;
        }
        // Only split between distinct values.
        if ordered[i].0 == ordered[i + 1].0 {
            continue;
        }
        let n_left = i + 1;
        let n_right = n - n_left;
        let weighted = (n_left as f32 * gini(left_pos, n_left)
            + n_right as f32 * gini(total_pos - left_pos, n_right))
            / n as f32;
        let decrease = node_gini - weighted;
        if decrease > 0.0 && best.map_or(true, |(_, d)| decrease > d) {
            let threshold = (ordered[i].0 + ordered[i + 1].0) / 2.0;
            best = Some((threshold, decrease));
        }
    }
    best
}

/// Normalize raw importances so they sum to 1 (all zeros stay zeros).
pub(crate) fn normalize_importances(raw: &mut [f32]) {
    let total: f32 = raw.iter().sum();
    if total > 0.0 {
        for v in raw.iter_mut() {
            *v /= total;
        }
    }
}

/// Standalone CART decision tree classifier.
pub struct DecisionTreeClassifier {
    settings: TreeSettings,
    root: Option<Node>,
    importances: Vec<f32>,
}

impl DecisionTreeClassifier {
    pub fn new(params: &ModelType) -> Self {
        match *params {
            ModelType::DecisionTree {
                max_depth,
                min_samples_split,
            } => DecisionTreeClassifier {
                settings: TreeSettings {
                    max_depth,
                    min_samples_split,
                    max_features: None,
                },
                root: None,
                importances: Vec::new(),
            },
            ref other => panic!("Expected ModelType::DecisionTree params, got {:?}", other),
        }
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError> {
        validate_fit_input(x, y)?;
        let indices: Vec<usize> = (0..x.nrows()).collect();
        // The grower only draws from the RNG when subsampling features,
        // which the standalone tree never does.
        let mut rng = StdRng::seed_from_u64(0);
        let fitted = grow_tree(x, y, &indices, &self.settings, &mut rng);
        let mut importances = fitted.importances;
        normalize_importances(&mut importances);
        self.root = Some(fitted.root);
        self.importances = importances;
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, PipelineError> {
        let probas = self.predict_proba(x)?;
        Ok(probas.iter().map(|&p| (p >= 0.5) as i32).collect())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError> {
        let root = self.root.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        Ok(x.rows().into_iter().map(|row| root.predict_row(row)).collect())
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn feature_importances(&self) -> Option<Vec<f32>> {
        self.root.as_ref().map(|_| self.importances.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn separable() -> (Array2<f32>, Vec<i32>) {
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                0.1, 5.0, 0.4, 5.0, 0.6, 5.0, 0.9, 5.0, 1.2, 5.0, 2.1, 5.0, 2.4, 5.0, 2.7, 5.0,
                3.0, 5.0, 3.3, 5.0,
            ],
        )
        .unwrap();
        let y = vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn learns_a_threshold_split() {
        let (x, y) = separable();
        let mut model = DecisionTreeClassifier::new(&ModelType::default_decision_tree());
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn importances_ignore_constant_features() {
        let (x, y) = separable();
        let mut model = DecisionTreeClassifier::new(&ModelType::default_decision_tree());
        model.fit(&x, &y).unwrap();
        let importances = model.feature_importances().unwrap();
        // Column 1 is constant; the entire signal is in column 0.
        assert!((importances[0] - 1.0).abs() < 1e-6);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn unfitted_predict_errors() {
        let model = DecisionTreeClassifier::new(&ModelType::default_decision_tree());
        let x = Array2::zeros((2, 2));
        assert!(model.predict(&x).is_err());
    }
}
