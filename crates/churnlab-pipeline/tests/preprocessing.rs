//! Integration tests for the dataset loader and the preprocessing module.

use churnlab_pipeline::config::PipelineConfig;
use churnlab_pipeline::dataset::read_csv_bytes;
use churnlab_pipeline::error::PipelineError;
use churnlab_pipeline::preprocessing::{preprocess, CategoryVocabulary, Scaler};
use ndarray::Array2;

fn telco_config() -> PipelineConfig {
    PipelineConfig {
        target_column: "churn".to_string(),
        drop_columns: vec!["id".to_string()],
        coerce_columns: vec!["total_charges".to_string()],
        ..PipelineConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Dataset loader
// ---------------------------------------------------------------------------

#[test]
fn loader_parses_header_and_rows() {
    let csv = b"id,plan,churn\n1,basic,No\n2,plus,Yes\n";
    let dataset = read_csv_bytes(csv).unwrap();
    assert_eq!(dataset.columns, vec!["id", "plan", "churn"]);
    assert_eq!(dataset.n_rows(), 2);
    assert_eq!(dataset.rows[1], vec!["2", "plus", "Yes"]);
}

#[test]
fn loader_rejects_ragged_rows() {
    let csv = b"a,b\n1,2\n3\n";
    assert!(matches!(
        read_csv_bytes(csv),
        Err(PipelineError::Parse(_))
    ));
}

#[test]
fn loader_rejects_zero_data_rows() {
    let csv = b"a,b\n";
    assert!(matches!(
        read_csv_bytes(csv),
        Err(PipelineError::Parse(_))
    ));
}

#[test]
fn loader_preview_returns_first_rows() {
    let csv = b"a\n1\n2\n3\n4\n5\n6\n7\n";
    let dataset = read_csv_bytes(csv).unwrap();
    let head = dataset.head(5);
    assert_eq!(head.len(), 5);
    assert_eq!(head[0], vec!["1"]);
    assert_eq!(head[4], vec!["5"]);
}

// ---------------------------------------------------------------------------
// Preprocessor
// ---------------------------------------------------------------------------

#[test]
fn identifier_column_is_dropped() {
    let csv = b"id,plan,total_charges,churn\n\
        a1,basic,10.0,No\n\
        a2,plus,20.0,Yes\n\
        a3,basic,30.0,No\n";
    let dataset = read_csv_bytes(csv).unwrap();
    let pre = preprocess(dataset, &telco_config()).unwrap();
    assert_eq!(pre.feature_names, vec!["plan", "total_charges"]);
}

#[test]
fn unparseable_coerce_values_drop_the_row() {
    let csv = b"id,plan,total_charges,churn\n\
        a1,basic,10.0,No\n\
        a2,plus, ,Yes\n\
        a3,basic,oops,No\n\
        a4,plus,40.0,Yes\n";
    let dataset = read_csv_bytes(csv).unwrap();
    let pre = preprocess(dataset, &telco_config()).unwrap();
    assert_eq!(pre.dropped_rows, 2);
    assert_eq!(pre.x.nrows(), 2);
}

#[test]
fn all_rows_dropped_is_insufficient_data() {
    let csv = b"id,total_charges,churn\na1,bad,No\na2,,Yes\n";
    let dataset = read_csv_bytes(csv).unwrap();
    assert!(matches!(
        preprocess(dataset, &telco_config()),
        Err(PipelineError::InsufficientData(_))
    ));
}

#[test]
fn categorical_codes_follow_first_encounter_order() {
    let csv = b"id,plan,total_charges,churn\n\
        a1,premium,1.0,No\n\
        a2,basic,2.0,Yes\n\
        a3,plus,3.0,No\n\
        a4,basic,4.0,Yes\n";
    let dataset = read_csv_bytes(csv).unwrap();
    let pre = preprocess(dataset, &telco_config()).unwrap();

    let vocab = pre.vocabularies.get("plan").unwrap();
    assert_eq!(vocab.encode("premium"), Some(0));
    assert_eq!(vocab.encode("basic"), Some(1));
    assert_eq!(vocab.encode("plus"), Some(2));
    assert_eq!(vocab.encode("enterprise"), None);

    // Encode-then-decode round trip for every fitted value.
    for category in vocab.categories() {
        let code = vocab.encode(category).unwrap();
        assert_eq!(vocab.decode(code), Some(category.as_str()));
    }

    // The encoded matrix mirrors the vocabulary codes.
    let plan_idx = pre.feature_names.iter().position(|n| n == "plan").unwrap();
    assert_eq!(pre.x[(0, plan_idx)], 0.0);
    assert_eq!(pre.x[(1, plan_idx)], 1.0);
    assert_eq!(pre.x[(2, plan_idx)], 2.0);
}

#[test]
fn target_codes_are_sorted_not_encounter_ordered() {
    // "Yes" appears first but must still encode above "No".
    let csv = b"id,total_charges,churn\na1,1.0,Yes\na2,2.0,No\na3,3.0,Yes\n";
    let dataset = read_csv_bytes(csv).unwrap();
    let pre = preprocess(dataset, &telco_config()).unwrap();
    assert_eq!(pre.target_vocabulary.encode("No"), Some(0));
    assert_eq!(pre.target_vocabulary.encode("Yes"), Some(1));
    assert_eq!(pre.y.to_vec(), vec![1, 0, 1]);
}

#[test]
fn missing_target_column_is_schema_mismatch() {
    let csv = b"id,total_charges\na1,1.0\na2,2.0\n";
    let dataset = read_csv_bytes(csv).unwrap();
    assert!(matches!(
        preprocess(dataset, &telco_config()),
        Err(PipelineError::SchemaMismatch { column }) if column == "churn"
    ));
}

// ---------------------------------------------------------------------------
// CategoryVocabulary
// ---------------------------------------------------------------------------

#[test]
fn vocabulary_is_bijective_over_fitted_values() {
    let vocab = CategoryVocabulary::fit(["b", "a", "b", "c"]);
    assert_eq!(vocab.len(), 3);
    assert_eq!(vocab.encode("b"), Some(0));
    assert_eq!(vocab.encode("a"), Some(1));
    assert_eq!(vocab.encode("c"), Some(2));
    assert_eq!(vocab.decode(1), Some("a"));
    assert_eq!(vocab.decode(3), None);
}

// ---------------------------------------------------------------------------
// Scaler
// ---------------------------------------------------------------------------

#[test]
fn scaler_standardizes_the_fit_partition() {
    let x = Array2::from_shape_vec(
        (4, 2),
        vec![1.0, 100.0, 2.0, 200.0, 3.0, 300.0, 4.0, 400.0],
    )
    .unwrap();
    let scaler = Scaler::fit(&x).unwrap();
    assert!((scaler.mean[0] - 2.5).abs() < 1e-5);
    assert!((scaler.mean[1] - 250.0).abs() < 1e-4);

    let t = scaler.transform(&x).unwrap();
    for c in 0..2 {
        let col_mean: f32 = (0..4).map(|r| t[(r, c)]).sum::<f32>() / 4.0;
        let col_var: f32 = (0..4).map(|r| (t[(r, c)] - col_mean).powi(2)).sum::<f32>() / 4.0;
        assert!(col_mean.abs() < 1e-4, "col {} mean = {}", c, col_mean);
        assert!((col_var - 1.0).abs() < 1e-3, "col {} var = {}", c, col_var);
    }
}

#[test]
fn scaler_reuses_stored_statistics_for_new_rows() {
    let train = Array2::from_shape_vec((3, 1), vec![0.0, 5.0, 10.0]).unwrap();
    let scaler = Scaler::fit(&train).unwrap();

    // A new row is transformed with the *training* mean/std, never refit.
    let scaled = scaler.transform_row(&[5.0]).unwrap();
    assert!(scaled[0].abs() < 1e-6);
    let scaled = scaler.transform_row(&[20.0]).unwrap();
    assert!(scaled[0] > 3.0);
}

#[test]
fn scaler_rejects_column_count_mismatch() {
    let train = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let scaler = Scaler::fit(&train).unwrap();
    assert!(scaler.transform_row(&[1.0]).is_err());
}
