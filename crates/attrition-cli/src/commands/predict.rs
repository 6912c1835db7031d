use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use attrition_classifiers::config::AttritionConfig;
use attrition_classifiers::data_handling::Cell;
use attrition_classifiers::ensemble::{AttritionEnsembleModel, RecordPrediction};
use attrition_classifiers::report::distribution::LEAVE_LABEL;
use attrition_classifiers::validation::{validate, Checker};

use crate::commands::train::{load_model, write_plots};

/// Outcome of a single-record prediction.
#[derive(Debug)]
pub struct PredictionOutcome {
    pub prediction: RecordPrediction,
    pub message: String,
    pub plot_files: Vec<PathBuf>,
}

/// The verdict shown to the person behind the record.
pub fn verdict_message(name: &str, label: usize) -> String {
    if label == LEAVE_LABEL {
        format!("{} it is best that you quit your job...", name)
    } else {
        format!("{} you shouldn't quit your job!", name)
    }
}

/// Check every supplied feature value against the rule derived from the
/// training data.
pub fn validate_record(model: &AttritionEnsembleModel, record: &HashMap<String, Cell>) -> Result<()> {
    let mut checks: Vec<(Checker, String)> = Vec::new();
    for feature in model.features() {
        if let Some(value) = record.get(&feature) {
            if let Some(checker) = Checker::for_column(model.table(), &feature)? {
                checks.push((checker, value.as_key()));
            }
        }
    }
    if let Err(err) = validate(checks.iter().map(|(c, v)| (c, v.as_str()))) {
        let hints: Vec<String> = checks
            .iter()
            .filter(|(c, _)| err.failures.iter().any(|(column, _)| column == c.column()))
            .map(|(c, _)| format!("{} ({})", c.column(), c.describe()))
            .collect();
        bail!("{}\naccepted values:\n{}", err, hints.join("\n"));
    }
    Ok(())
}

/// Drop every feature the record leaves blank so the ensemble is trained on
/// exactly the columns the record supplies.
pub fn drop_blank_features(
    model: &mut AttritionEnsembleModel,
    record: &HashMap<String, Cell>,
) -> Result<Vec<String>> {
    let blank: Vec<String> = model
        .features()
        .into_iter()
        .filter(|f| !record.contains_key(f))
        .collect();
    for feature in &blank {
        log::info!("No value given for '{}', dropping it", feature);
        model.drop_column(feature)?;
    }
    Ok(blank)
}

/// Validate the record, train on the columns it supplies, chart the test set
/// and predict the record.
pub fn run_prediction(
    data_path: &Path,
    record: &HashMap<String, Cell>,
    config: &AttritionConfig,
    plots_root: Option<&Path>,
    name: &str,
) -> Result<PredictionOutcome> {
    let mut model = load_model(data_path, config)?;
    validate_record(&model, record)?;
    drop_blank_features(&mut model, record)?;

    log::info!("Training model...");
    model.train()?;
    log::info!("Done!");

    let plot_files = match plots_root {
        Some(root) => write_plots(&model, config, root)?,
        None => Vec::new(),
    };

    log::info!("Predicting your values!");
    let prediction = model.predict_record(record)?;
    for (member, label) in &prediction.votes {
        log::debug!("{} voted {}", member, label);
    }

    Ok(PredictionOutcome {
        message: verdict_message(name, prediction.label),
        prediction,
        plot_files,
    })
}
