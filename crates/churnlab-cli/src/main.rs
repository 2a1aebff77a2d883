use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use churnlab_cli::workbench;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CHURNLAB_LOG", "error,churnlab=info"))
        .init();

    let matches = Command::new("churnlab")
        .version(clap::crate_version!())
        .about("Churnlab - an interactive churn-prediction workbench")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("report")
                .about("Train the model bank on a CSV and write an HTML report")
                .arg(
                    Arg::new("csv")
                        .help("Path to the input CSV file")
                        .required(true)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a pipeline JSON configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Path for the HTML report. Defaults to churnlab_report.html")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Train on a CSV, then query one model for a churn prediction")
                .arg(
                    Arg::new("csv")
                        .help("Path to the input CSV file")
                        .required(true)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .help("Model to query")
                        .value_parser([
                            "logistic_regression",
                            "decision_tree",
                            "random_forest",
                            "knn",
                        ])
                        .default_value("random_forest"),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a pipeline JSON configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("set")
                        .short('s')
                        .long("set")
                        .help("Feature value as column=value. Repeatable; unspecified numeric columns use the training mean")
                        .action(ArgAction::Append)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("interactive")
                        .short('i')
                        .long("interactive")
                        .help("Prompt for each feature on stdin instead of using --set pairs")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("report", sub)) => handle_report(sub),
        Some(("predict", sub)) => handle_predict(sub),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn handle_report(matches: &ArgMatches) -> Result<()> {
    let csv: &String = matches.get_one("csv").unwrap();
    let csv = workbench::validate_csv_file(csv)?;
    let config = workbench::load_config(matches.get_one::<PathBuf>("config"))?;
    let default_output = PathBuf::from("churnlab_report.html");
    let output = matches
        .get_one::<PathBuf>("output")
        .unwrap_or(&default_output);
    workbench::run_report(&csv, &config, output)
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let csv: &String = matches.get_one("csv").unwrap();
    let csv = workbench::validate_csv_file(csv)?;
    let config = workbench::load_config(matches.get_one::<PathBuf>("config"))?;
    let model: &String = matches.get_one("model").unwrap();

    if matches.get_flag("interactive") {
        return workbench::run_interactive(&csv, &config, model);
    }

    let fields: Vec<(String, String)> = matches
        .get_many::<String>("set")
        .unwrap_or_default()
        .map(|pair| workbench::parse_set_arg(pair))
        .collect::<Result<_>>()?;
    workbench::run_predict(&csv, &config, model, &fields)
}
