use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotly::common::Marker;
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};

use crate::report::distribution::{DistributionReport, FeatureDistribution};

/// Bar chart of one column's bucket counts.
pub fn plot_distribution(distribution: &FeatureDistribution) -> Plot {
    let trace = Bar::new(distribution.labels.clone(), distribution.counts.clone())
        .name(distribution.column.as_str())
        .width(0.4)
        .marker(Marker::new().color("maroon"));

    let y_title = format!("{} Values", distribution.column);
    let layout = Layout::new()
        .title(distribution.column.as_str())
        .y_axis(Axis::new().title(y_title.as_str()));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Write one `<column>.html` chart per distribution into `directory`,
/// creating it if needed.
///
/// # Returns
///
/// Paths of the written files, in report order.
pub fn save_distribution_plots<P: AsRef<Path>>(
    report: &DistributionReport,
    directory: P,
) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create plot directory: {}", directory.display()))?;

    let mut written = Vec::with_capacity(report.distributions.len());
    for distribution in report.iter() {
        log::info!("Saving figure: {}", distribution.column);
        let path = directory.join(format!("{}.html", distribution.column));
        let html = plot_distribution(distribution).to_html();
        fs::write(&path, html)
            .with_context(|| format!("Failed to write plot: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_file_per_column() {
        let report = DistributionReport {
            distributions: vec![
                FeatureDistribution {
                    column: "Gender".to_string(),
                    labels: vec!["Female".to_string(), "Male".to_string()],
                    counts: vec![2, 3],
                },
                FeatureDistribution {
                    column: "Attrition".to_string(),
                    labels: vec!["No".to_string(), "Yes".to_string()],
                    counts: vec![4, 5],
                },
            ],
            positive_rows: 5,
            mistakes: vec![],
        };

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("plots");
        let paths = save_distribution_plots(&report, &out).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(out.join("Gender.html").is_file());
        assert!(out.join("Attrition.html").is_file());
        let html = std::fs::read_to_string(out.join("Gender.html")).unwrap();
        assert!(html.contains("Female"));
    }
}
