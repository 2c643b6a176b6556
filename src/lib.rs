pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::toml_config::TomlConfig;

pub use crate::core::{etl::LayerEngine, pipeline::LayerPipeline};
pub use crate::domain::gazetteer::Gazetteer;
pub use crate::utils::error::{LayerError, Result};
