//! Logistic regression fit by batch gradient descent.
//!
//! Expects standardized features; the fixed learning rate is tuned for
//! zero-mean unit-variance inputs, which the pipeline guarantees.
use ndarray::Array2;

use crate::config::ModelType;
use crate::error::PipelineError;
use crate::models::{not_fitted, validate_fit_input, ClassifierModel};

pub struct LogisticRegressionClassifier {
    learning_rate: f32,
    epochs: usize,
    l2: f32,
    weights: Vec<f32>,
    bias: f32,
    fitted: bool,
}

impl LogisticRegressionClassifier {
    pub fn new(params: &ModelType) -> Self {
        match *params {
            ModelType::LogisticRegression {
                learning_rate,
                epochs,
                l2,
            } => LogisticRegressionClassifier {
                learning_rate,
                epochs,
                l2,
                weights: Vec::new(),
                bias: 0.0,
                fitted: false,
            },
            ref other => panic!(
                "Expected ModelType::LogisticRegression params, got {:?}",
                other
            ),
        }
    }

    fn proba_row(&self, row: &[f32]) -> f32 {
        let z = self
            .weights
            .iter()
            .zip(row)
            .map(|(w, v)| w * v)
            .sum::<f32>()
            + self.bias;
        sigmoid(z)
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl ClassifierModel for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError> {
        validate_fit_input(x, y)?;

        let (n_rows, n_features) = x.dim();
        let n = n_rows as f32;
        self.weights = vec![0.0; n_features];
        self.bias = 0.0;

        let mut grad = vec![0.0f32; n_features];
        for _epoch in 0..self.epochs {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_bias = 0.0f32;

            for (row, &label) in x.rows().into_iter().zip(y) {
                let row = row.as_slice().expect("row views of a dense matrix are contiguous");
                let residual = self.proba_row(row) - label as f32;
                for (g, v) in grad.iter_mut().zip(row) {
                    *g += residual * v;
                }
                grad_bias += residual;
            }

            for (w, g) in self.weights.iter_mut().zip(&grad) {
                *w -= self.learning_rate * (g / n + self.l2 * *w);
            }
            self.bias -= self.learning_rate * grad_bias / n;
        }

        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, PipelineError> {
        let probas = self.predict_proba(x)?;
        Ok(probas.iter().map(|&p| (p >= 0.5) as i32).collect())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError> {
        if !self.fitted {
            return Err(not_fitted(self.name()));
        }
        if x.ncols() != self.weights.len() {
            return Err(PipelineError::Shape(format!(
                "model fit on {} features, got {}",
                self.weights.len(),
                x.ncols()
            )));
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let row = row.as_slice().expect("row views of a dense matrix are contiguous");
                self.proba_row(row)
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn separable_data_is_learned() {
        // One informative feature: negative values are class 0, positive 1.
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                -1.2, 0.3, -0.8, -0.1, -1.0, 0.2, -0.9, 0.0, 1.1, 0.1, 0.8, -0.2, 1.3, 0.0, 0.9,
                0.3,
            ],
        )
        .unwrap();
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1];

        let mut model =
            LogisticRegressionClassifier::new(&ModelType::default_logistic_regression());
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions, y);

        let probas = model.predict_proba(&x).unwrap();
        assert!(probas.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn single_class_fit_fails() {
        let x = Array2::zeros((4, 2));
        let y = vec![1, 1, 1, 1];
        let mut model =
            LogisticRegressionClassifier::new(&ModelType::default_logistic_regression());
        assert!(matches!(
            model.fit(&x, &y),
            Err(PipelineError::Training(_))
        ));
    }
}
