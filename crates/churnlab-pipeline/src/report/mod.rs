//! Self-contained HTML report for one training run.
//!
//! Renders the dataset preview, class balance, per-model metrics, and the
//! top-10 feature importance chart into a single page a browser can open
//! directly. Plotly traces are inlined; the plotly runtime loads from its
//! CDN.
pub mod plots;

use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::evaluation::classification_report;
use crate::pipeline::PipelineState;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

/// Render the full report page.
pub fn render_report(state: &PipelineState, title: &str) -> String {
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let importance_html = plots::plot_feature_importance(
        &state.rank_features(),
        "Top feature importances (random forest)",
    )
    .map(|plot| plot.to_inline_html(Some("feature-importance")))
    .ok();

    let accuracies: Vec<(String, f32)> = state
        .summaries()
        .iter()
        .map(|summary| (summary.name.clone(), summary.evaluation.accuracy))
        .collect();
    let accuracy_html = plots::plot_model_accuracy(&accuracies, "Held-out accuracy by model")
        .map(|plot| plot.to_inline_html(Some("model-accuracy")))
        .ok();

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                script src=(PLOTLY_CDN) {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { (title) }
                p.meta { "Generated " (generated) }

                h2 { "Dataset" }
                (class_balance_table(state))
                @if state.dropped_rows() > 0 {
                    p { (state.dropped_rows()) " row(s) dropped during numeric coercion." }
                }
                h3 { "Preview (first " (state.preview().len()) " rows)" }
                (preview_table(state))

                h2 { "Model performance" }
                @if let Some(chart) = &accuracy_html {
                    div { (PreEscaped(chart.clone())) }
                }
                @for summary in state.summaries() {
                    h3 { (summary.name) }
                    p {
                        "Accuracy " (format!("{:.4}", summary.evaluation.accuracy))
                        ", trained in " (format!("{:.3}s", summary.train_seconds))
                    }
                    (confusion_table(state, summary))
                    pre {
                        (classification_report(
                            &summary.evaluation,
                            &state.class_names(&summary.evaluation),
                        ))
                    }
                }

                h2 { "Feature importance" }
                @if let Some(chart) = &importance_html {
                    div { (PreEscaped(chart.clone())) }
                } @else {
                    p { "No trained model exposes feature importances." }
                }
            }
        }
    };

    markup.into_string()
}

/// Render and write the report to a file.
pub fn write_report<P: AsRef<Path>>(state: &PipelineState, title: &str, path: P) -> Result<()> {
    let html = render_report(state, title);
    std::fs::write(&path, html)
        .with_context(|| format!("Failed to write report: {}", path.as_ref().display()))?;
    log::info!("Wrote report to {}", path.as_ref().display());
    Ok(())
}

fn class_balance_table(state: &PipelineState) -> Markup {
    html! {
        table {
            tr { th { "Class" } th { "Rows" } }
            @for (label, count) in state.class_balance() {
                tr { td { (label) } td { (count) } }
            }
        }
    }
}

fn preview_table(state: &PipelineState) -> Markup {
    html! {
        table {
            tr {
                @for column in state.preview_columns() {
                    th { (column) }
                }
            }
            @for row in state.preview() {
                tr {
                    @for cell in row {
                        td { (cell) }
                    }
                }
            }
        }
    }
}

fn confusion_table(state: &PipelineState, summary: &crate::pipeline::ModelSummary) -> Markup {
    let evaluation = &summary.evaluation;
    let names = state.class_names(evaluation);
    html! {
        table {
            tr {
                th { "actual \\ predicted" }
                @for name in &names {
                    th { (name) }
                }
            }
            @for (i, name) in names.iter().enumerate() {
                tr {
                    th { (name) }
                    @for j in 0..names.len() {
                        td { (evaluation.confusion[(i, j)]) }
                    }
                }
            }
        }
    }
}

const STYLE: &str = "
body { font-family: sans-serif; margin: 2rem; max-width: 60rem; }
table { border-collapse: collapse; margin: 0.5rem 0; }
th, td { border: 1px solid #999; padding: 0.25rem 0.6rem; text-align: left; }
pre { background: #f6f6f6; padding: 0.6rem; }
.meta { color: #666; }
";
