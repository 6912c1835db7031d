use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use attrition_classifiers::config::{ModelConfig, ModelType};
use attrition_cli::commands::input::{load_config_or_default, load_record};
use attrition_cli::commands::predict::run_prediction;
use attrition_cli::commands::train::run_training;

fn main() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("ATTRITION_LOG", "error,attrition=info"))
        .init();

    let config_arg = || {
        Arg::new("config")
            .short('c')
            .long("config")
            .help("Path to a JSON configuration file. Defaults are used when omitted.")
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    };
    let data_arg = || {
        Arg::new("data")
            .help("Path to the employee data file (*.csv or *.tsv)")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    };
    let plots_arg = || {
        Arg::new("plots")
            .short('p')
            .long("plots")
            .help("Directory that receives one timestamped folder of charts per run")
            .default_value("Plots")
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::DirPath)
    };
    let no_plots_arg = || {
        Arg::new("no_plots")
            .long("no-plots")
            .help("Skip writing distribution charts.")
            .action(ArgAction::SetTrue)
    };
    let model_arg = || {
        Arg::new("model_type")
            .long("model-type")
            .help("Replace the configured ensemble with members of a single type.")
            .value_parser(["random_forest", "random_forest_entropy", "bagging", "knn", "gbdt"])
            .action(ArgAction::Append)
            .value_hint(ValueHint::Other)
    };

    let matches = Command::new("attrition")
        .version(clap::crate_version!())
        .about("HR attrition ensemble: train on employee data and predict whether to quit")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train the ensemble and report member accuracies")
                .arg(data_arg())
                .arg(config_arg())
                .arg(plots_arg())
                .arg(no_plots_arg())
                .arg(model_arg()),
        )
        .subcommand(
            Command::new("predict")
                .about("Train on the columns a record supplies and predict that record")
                .arg(data_arg())
                .arg(
                    Arg::new("record")
                        .short('r')
                        .long("record")
                        .help("Path to a JSON object of column -> value. Blank columns are dropped.")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Name used in the verdict")
                        .default_value("You")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(config_arg())
                .arg(plots_arg())
                .arg(no_plots_arg())
                .arg(model_arg()),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("There was a failure: {:#}", e);
        std::process::exit(1);
    }
}

fn plots_root(matches: &ArgMatches) -> Option<&Path> {
    if matches.get_flag("no_plots") {
        return None;
    }
    matches.get_one::<PathBuf>("plots").map(PathBuf::as_path)
}

fn load_config(matches: &ArgMatches) -> Result<attrition_classifiers::config::AttritionConfig> {
    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let mut config = load_config_or_default(config_path)?;

    if let Some(model_types) = matches.get_many::<String>("model_type") {
        config.models = model_types
            .map(|m| {
                ModelType::from_str(m)
                    .map(|model_type| ModelConfig::new(m.clone(), model_type))
                    .map_err(anyhow::Error::msg)
            })
            .collect::<Result<Vec<_>>>()?;
    }
    Ok(config)
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let data_path: &PathBuf = matches
        .get_one("data")
        .ok_or_else(|| anyhow::anyhow!("data file is required"))?;
    let config = load_config(matches)?;
    log::info!("[Attrition] Training on {:?}", data_path);

    let outcome = run_training(data_path, &config, plots_root(matches))?;
    for score in &outcome.scores {
        println!(
            "{}\ttrain accuracy {:.4}\ttest accuracy {:.4}",
            score.name, score.train_accuracy, score.test_accuracy
        );
    }
    if !outcome.plot_files.is_empty() {
        eprintln!("[Attrition] Wrote {} charts", outcome.plot_files.len());
    }
    Ok(())
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let data_path: &PathBuf = matches
        .get_one("data")
        .ok_or_else(|| anyhow::anyhow!("data file is required"))?;
    let record_path: &PathBuf = matches
        .get_one("record")
        .ok_or_else(|| anyhow::anyhow!("record file is required"))?;
    let name = matches
        .get_one::<String>("name")
        .map(String::as_str)
        .unwrap_or("You");
    let config = load_config(matches)?;
    let record = load_record(record_path)?;
    log::info!("[Attrition] Predicting {:?} against {:?}", record_path, data_path);

    let outcome = run_prediction(data_path, &record, &config, plots_root(matches), name)?;
    println!("{}", outcome.message);
    println!(
        "Satisfaction score: {:.1}%",
        outcome.prediction.satisfaction_score
    );
    Ok(())
}
