//! K-nearest-neighbors classifier over scaled features.
//!
//! Stores the training partition and votes among the k nearest rows by
//! Euclidean distance; the positive-class probability is the vote fraction.
use ndarray::{Array2, ArrayView1};

use crate::config::ModelType;
use crate::error::PipelineError;
use crate::models::{not_fitted, validate_fit_input, ClassifierModel};

pub struct KnnClassifier {
    k: usize,
    x_train: Option<Array2<f32>>,
    y_train: Vec<i32>,
}

impl KnnClassifier {
    pub fn new(params: &ModelType) -> Self {
        match *params {
            ModelType::Knn { k } => KnnClassifier {
                k,
                x_train: None,
                y_train: Vec::new(),
            },
            ref other => panic!("Expected ModelType::Knn params, got {:?}", other),
        }
    }

    fn proba_row(&self, x_train: &Array2<f32>, row: ArrayView1<'_, f32>) -> f32 {
        let mut distances: Vec<(f32, i32)> = x_train
            .rows()
            .into_iter()
            .zip(&self.y_train)
            .map(|(train_row, &label)| {
                let d: f32 = train_row
                    .iter()
                    .zip(row.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (d, label)
            })
            .collect();
        distances
            .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let k = self.k.min(distances.len()).max(1);
        let votes = distances[..k].iter().filter(|(_, label)| *label == 1).count();
        votes as f32 / k as f32
    }
}

impl ClassifierModel for KnnClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError> {
        validate_fit_input(x, y)?;
        if self.k == 0 {
            return Err(PipelineError::Training("k must be at least 1".to_string()));
        }
        self.x_train = Some(x.clone());
        self.y_train = y.to_vec();
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, PipelineError> {
        let probas = self.predict_proba(x)?;
        Ok(probas.iter().map(|&p| (p >= 0.5) as i32).collect())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError> {
        let x_train = self.x_train.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        if x.ncols() != x_train.ncols() {
            return Err(PipelineError::Shape(format!(
                "model fit on {} features, got {}",
                x_train.ncols(),
                x.ncols()
            )));
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| self.proba_row(x_train, row))
            .collect())
    }

    fn name(&self) -> &'static str {
        "knn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn nearest_neighbors_vote() {
        let x = Array2::from_shape_vec(
            (6, 1),
            vec![0.0, 0.1, 0.2, 5.0, 5.1, 5.2],
        )
        .unwrap();
        let y = vec![0, 0, 0, 1, 1, 1];

        let mut model = KnnClassifier::new(&ModelType::Knn { k: 3 });
        model.fit(&x, &y).unwrap();

        let queries = Array2::from_shape_vec((2, 1), vec![0.05, 5.05]).unwrap();
        assert_eq!(model.predict(&queries).unwrap(), vec![0, 1]);

        let probas = model.predict_proba(&queries).unwrap();
        assert_eq!(probas, vec![0.0, 1.0]);
    }
}
