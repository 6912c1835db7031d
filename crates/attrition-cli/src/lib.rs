//! attrition-cli: command line front-end for the HR attrition ensemble.
pub mod commands;
pub mod util;
