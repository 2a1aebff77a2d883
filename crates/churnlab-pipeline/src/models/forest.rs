//! Bagged random forest built from the CART grower in [`super::tree`].
//!
//! Trees are fit in parallel with rayon, each on a bootstrap sample with
//! sqrt-feature subsampling per split. Feature importances are the summed
//! impurity decreases across trees, normalized to sum to 1.
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::ModelType;
use crate::error::PipelineError;
use crate::models::tree::{grow_tree, normalize_importances, Node, TreeSettings};
use crate::models::{not_fitted, validate_fit_input, ClassifierModel};

pub struct RandomForestClassifier {
    n_trees: usize,
    max_depth: usize,
    min_samples_split: usize,
    seed: u64,
    trees: Vec<Node>,
    importances: Vec<f32>,
}

impl RandomForestClassifier {
    pub fn new(params: &ModelType) -> Self {
        match *params {
            ModelType::RandomForest {
                n_trees,
                max_depth,
                min_samples_split,
                seed,
            } => RandomForestClassifier {
                n_trees,
                max_depth,
                min_samples_split,
                seed,
                trees: Vec::new(),
                importances: Vec::new(),
            },
            ref other => panic!("Expected ModelType::RandomForest params, got {:?}", other),
        }
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError> {
        validate_fit_input(x, y)?;
        if self.n_trees == 0 {
            return Err(PipelineError::Training(
                "random forest needs at least one tree".to_string(),
            ));
        }

        let n_rows = x.nrows();
        let n_features = x.ncols();
        let max_features = ((n_features as f32).sqrt().round() as usize).max(1);
        let settings = TreeSettings {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: Some(max_features),
        };

        let seed = self.seed;
        let fitted: Vec<_> = (0..self.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let bootstrap: Vec<usize> =
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
                grow_tree(x, y, &bootstrap, &settings, &mut rng)
            })
            .collect();

        let mut importances = vec![0.0f32; n_features];
        let mut trees = Vec::with_capacity(self.n_trees);
        for tree in fitted {
            for (total, contribution) in importances.iter_mut().zip(&tree.importances) {
                *total += *contribution;
            }
            trees.push(tree.root);
        }
        normalize_importances(&mut importances);

        self.trees = trees;
        self.importances = importances;
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, PipelineError> {
        let probas = self.predict_proba(x)?;
        Ok(probas.iter().map(|&p| (p >= 0.5) as i32).collect())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError> {
        if self.trees.is_empty() {
            return Err(not_fitted(self.name()));
        }
        let n_trees = self.trees.len() as f32;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let total: f32 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
                total / n_trees
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn feature_importances(&self) -> Option<Vec<f32>> {
        if self.trees.is_empty() {
            None
        } else {
            Some(self.importances.clone())
        }
    }
}
