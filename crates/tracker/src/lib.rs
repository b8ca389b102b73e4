//! Gas tracker binary support: configuration loading and text reports

pub mod report;
pub mod settings;

pub use settings::{config_path, load_config};
