//! Workbench commands: train-and-report, and ad-hoc prediction queries.
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use churnlab_pipeline::config::PipelineConfig;
use churnlab_pipeline::dataset::read_csv_path;
use churnlab_pipeline::error::PipelineError;
use churnlab_pipeline::evaluation::classification_report;
use churnlab_pipeline::pipeline::{train_pipeline, PipelineState};
use churnlab_pipeline::report::write_report;

/// Check that a path exists and carries a .csv extension.
pub fn validate_csv_file(path: &str) -> Result<PathBuf> {
    let path = PathBuf::from(path);
    if !path.is_file() {
        bail!("Input file does not exist: {}", path.display());
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(path),
        _ => bail!("Expected a .csv file, got: {}", path.display()),
    }
}

/// Parse a `column=value` pair from a --set argument.
pub fn parse_set_arg(arg: &str) -> Result<(String, String)> {
    let (column, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected column=value, got '{}'", arg))?;
    let column = column.trim();
    if column.is_empty() {
        bail!("Expected column=value, got '{}'", arg);
    }
    Ok((column.to_string(), value.trim().to_string()))
}

/// Load the config file, or fall back to defaults (and print them, so the
/// user can copy a starting point).
pub fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path),
        None => {
            let config = PipelineConfig::default();
            let json = serde_json::to_string_pretty(&config).unwrap_or_default();
            eprintln!("[churnlab] No config provided; using defaults:\n{}", json);
            Ok(config)
        }
    }
}

/// Train the full pipeline from a CSV file.
pub fn train(csv_path: &Path, config: &PipelineConfig) -> Result<PipelineState> {
    let dataset = read_csv_path(csv_path)?;
    let state = train_pipeline(dataset, config)
        .with_context(|| format!("Pipeline failed for {}", csv_path.display()))?;
    Ok(state)
}

/// Print per-model metrics to stdout.
pub fn print_summaries(state: &PipelineState) {
    for summary in state.summaries() {
        println!("--- {} ---", summary.name);
        println!(
            "accuracy: {:.4} (trained in {:.3}s)",
            summary.evaluation.accuracy, summary.train_seconds
        );
        println!(
            "{}",
            classification_report(
                &summary.evaluation,
                &state.class_names(&summary.evaluation)
            )
        );
    }

    let ranked = state.rank_features();
    if !ranked.is_empty() {
        println!("--- top feature importances ---");
        // Ranked ascending for chart order; print largest first here.
        for (name, score) in ranked.iter().rev() {
            println!("{:>12.4}  {}", score, name);
        }
    }
}

/// Train, print metrics, and write the HTML report.
pub fn run_report(csv_path: &Path, config: &PipelineConfig, output: &Path) -> Result<()> {
    let state = train(csv_path, config)?;
    print_summaries(&state);
    write_report(&state, "Churnlab training report", output)?;
    println!("Report written to {}", output.display());
    Ok(())
}

/// Train, then answer a single query assembled from --set pairs.
pub fn run_predict(
    csv_path: &Path,
    config: &PipelineConfig,
    model_name: &str,
    fields: &[(String, String)],
) -> Result<()> {
    let state = train(csv_path, config)?;
    let input: HashMap<String, String> = fields.iter().cloned().collect();
    match state.predict(model_name, &input) {
        Ok(prediction) => {
            println!("{} ({:.2}% churn probability)", prediction.label, prediction.probability_pct);
            Ok(())
        }
        Err(e) => Err(anyhow!(e)),
    }
}

/// Train, then answer queries interactively until EOF.
///
/// Each round prompts once per feature column; categorical fields list the
/// fitted vocabulary, numeric fields default to the training mean when left
/// blank. Query-scoped errors are printed and the loop continues.
pub fn run_interactive(csv_path: &Path, config: &PipelineConfig, model_name: &str) -> Result<()> {
    let state = train(csv_path, config)?;
    if !state.model_names().iter().any(|&name| name == model_name) {
        bail!(PipelineError::UnknownModel(model_name.to_string()));
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let mut input = HashMap::new();
        for name in state.feature_names() {
            match state.vocabulary(name) {
                Some(vocab) => {
                    print!("{} {:?}: ", name, vocab.categories());
                }
                None => {
                    let mean = state.numeric_default(name).unwrap_or(0.0);
                    print!("{} [default {:.2}]: ", name, mean);
                }
            }
            std::io::stdout().flush().ok();

            let Some(line) = lines.next() else {
                return Ok(());
            };
            let value = line.context("Failed to read input")?;
            let value = value.trim();
            if value.is_empty() {
                // Categorical fields fall back to the first vocabulary
                // entry, matching a dropdown's initial selection.
                if let Some(vocab) = state.vocabulary(name) {
                    if let Some(first) = vocab.categories().first() {
                        input.insert(name.clone(), first.clone());
                    }
                }
            } else {
                input.insert(name.clone(), value.to_string());
            }
        }

        match state.predict(model_name, &input) {
            Ok(prediction) => println!(
                "=> {} ({:.2}% churn probability)",
                prediction.label, prediction.probability_pct
            ),
            // Query-scoped: report and let the user try again.
            Err(e) => eprintln!("Query failed: {}", e),
        }

        print!("Another prediction? [y/N]: ");
        std::io::stdout().flush().ok();
        match lines.next() {
            Some(Ok(answer)) if answer.trim().eq_ignore_ascii_case("y") => continue,
            _ => return Ok(()),
        }
    }
}
