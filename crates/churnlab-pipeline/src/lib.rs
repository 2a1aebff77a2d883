//! churnlab-pipeline: machine-learning plumbing for the churn workbench.
//!
//! This crate provides the full training/prediction pipeline: CSV dataset
//! loading, preprocessing (column dropping, numeric coercion, label
//! encoding), a stratified splitter with a standard scaler, a bank of four
//! in-crate classifiers, evaluation metrics, feature ranking, and the
//! single-row predictor that re-applies the fitted encodings and scaling.
//!
//! The design favors small, testable modules. All trained state lives in an
//! explicit [`pipeline::PipelineState`] value that callers pass around; the
//! crate holds no global state, so sessions are naturally isolated.
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod split;
