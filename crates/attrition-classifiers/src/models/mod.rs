pub mod classifier_trait;
pub mod factory;
pub mod forest;
pub mod gbdt;
pub mod knn;

pub use classifier_trait::ClassifierModel;
