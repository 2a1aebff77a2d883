use crate::config::ModelType;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::forest::RandomForestClassifier;
use crate::models::knn::KnnClassifier;
use crate::models::logistic::LogisticRegressionClassifier;
use crate::models::tree::DecisionTreeClassifier;

/// Build a boxed classifier from a `ModelType`.
pub fn build_model(params: &ModelType) -> Box<dyn ClassifierModel> {
    match params {
        ModelType::LogisticRegression { .. } => {
            Box::new(LogisticRegressionClassifier::new(params))
        }
        ModelType::DecisionTree { .. } => Box::new(DecisionTreeClassifier::new(params)),
        ModelType::RandomForest { .. } => Box::new(RandomForestClassifier::new(params)),
        ModelType::Knn { .. } => Box::new(KnnClassifier::new(params)),
    }
}
