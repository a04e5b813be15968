//! Pipelines.
//!
//! [Preprocess] chains the processing stages, and [config] holds its settings.
//! The light [pipeline::Pipeline] trait is what makes a pipeline runnable.
pub mod config;
#[allow(clippy::module_inception)]
pub mod pipeline;
mod preprocess;

pub use config::{Directories, PreprocessConfig, QeConfig, VocabSelector};
pub use pipeline::Pipeline;
pub use preprocess::Preprocess;
