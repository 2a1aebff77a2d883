use plotly::common::Orientation;
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};

/// Horizontal bar chart of ranked feature importances.
///
/// Expects the ranking ascending by score so the largest bar renders at the
/// top of the chart.
pub fn plot_feature_importance(ranked: &[(String, f32)], title: &str) -> Result<Plot, String> {
    if ranked.is_empty() {
        return Err("no feature importances to plot".to_string());
    }

    let names: Vec<String> = ranked.iter().map(|(name, _)| name.clone()).collect();
    let scores: Vec<f32> = ranked.iter().map(|(_, score)| *score).collect();

    let trace = Bar::new(scores, names).orientation(Orientation::Horizontal);

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Importance"))
        .y_axis(Axis::new().title("Feature"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);

    Ok(plot)
}

/// Vertical bar chart of per-model held-out accuracy.
pub fn plot_model_accuracy(accuracies: &[(String, f32)], title: &str) -> Result<Plot, String> {
    if accuracies.is_empty() {
        return Err("no model accuracies to plot".to_string());
    }

    let names: Vec<String> = accuracies.iter().map(|(name, _)| name.clone()).collect();
    let scores: Vec<f32> = accuracies.iter().map(|(_, score)| *score).collect();

    let trace = Bar::new(names, scores);

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Model"))
        .y_axis(Axis::new().title("Accuracy"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);

    Ok(plot)
}
