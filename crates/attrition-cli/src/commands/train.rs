use std::path::{Path, PathBuf};

use anyhow::Result;

use attrition_classifiers::config::AttritionConfig;
use attrition_classifiers::ensemble::{AttritionEnsembleModel, MemberScore};
use attrition_classifiers::io::read_table_csv;
use attrition_classifiers::report::plots::save_distribution_plots;

use crate::util::{timestamped_dir, validate_tsv_or_csv_file};

/// Outcome of a training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub scores: Vec<MemberScore>,
    pub plot_files: Vec<PathBuf>,
}

/// Build an ensemble over the data file, with the configured drop columns
/// already removed.
pub fn load_model(data_path: &Path, config: &AttritionConfig) -> Result<AttritionEnsembleModel> {
    validate_tsv_or_csv_file(data_path)?;
    let table = read_table_csv(data_path)?;
    Ok(AttritionEnsembleModel::new(table, config)?)
}

/// Write the distribution charts of a trained model into a fresh
/// timestamped directory under `plots_root`.
pub fn write_plots(
    model: &AttritionEnsembleModel,
    config: &AttritionConfig,
    plots_root: &Path,
) -> Result<Vec<PathBuf>> {
    let report = model.distribution_report(&config.report)?;
    let directory = timestamped_dir(plots_root);
    log::info!("Visualizing model into {}", directory.display());
    save_distribution_plots(&report, &directory)
}

/// Train every member and optionally chart the test-set distributions.
pub fn run_training(
    data_path: &Path,
    config: &AttritionConfig,
    plots_root: Option<&Path>,
) -> Result<TrainingOutcome> {
    let mut model = load_model(data_path, config)?;

    log::info!("Training model...");
    let scores = model.train()?;
    log::info!("Done!");

    let plot_files = match plots_root {
        Some(root) => write_plots(&model, config, root)?,
        None => Vec::new(),
    };

    Ok(TrainingOutcome { scores, plot_files })
}
