pub mod distribution;
pub mod plots;

pub use distribution::{Binning, DistributionReport, DistributionReporter, FeatureDistribution};
