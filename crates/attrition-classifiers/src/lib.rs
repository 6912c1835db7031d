//! attrition-classifiers: ensemble classification of HR attrition data.
//!
//! This crate provides the tabular dataset model, categorical encoding and
//! feature index bookkeeping, a small family of classifier wrappers (bagged
//! decision trees, random forests, k-nearest-neighbours and gradient boosted
//! trees), majority voting across them, and distribution reports for the
//! employees the ensemble predicts will leave.
//!
//! Everything runs synchronously on the calling thread; a training run blocks
//! until every ensemble member has been fitted.
pub mod config;
pub mod data_handling;
pub mod ensemble;
pub mod error;
pub mod feature_index;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod stats;
pub mod validation;
pub mod voting;

pub use error::{AttritionError, Result};
