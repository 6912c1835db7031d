use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

pub fn validate_tsv_or_csv_file(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path.display()),
    }

    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    Ok(())
}

/// Fresh per-run output directory `<root>/<HH_MM_SS_micros>`.
pub fn timestamped_dir(root: &Path) -> PathBuf {
    root.join(Local::now().format("%H_%M_%S_%6f").to_string())
}
