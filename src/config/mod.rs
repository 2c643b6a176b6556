pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::ports::OutputFormat;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "district-layers")]
#[command(about = "Validate two-column Location CSV files and build district map layers")]
pub struct CliConfig {
    /// Layer CSV files or http(s) URLs (comma-separated or repeated)
    #[arg(short = 'i', long = "input", value_delimiter = ',', required = true)]
    pub inputs: Vec<String>,

    #[arg(short, long, default_value = "./output")]
    pub output_path: String,

    /// CSV with District,Province columns replacing the built-in list
    #[arg(long)]
    pub gazetteer: Option<String>,

    /// Reject a layer if any location is not an official district name
    #[arg(long)]
    pub strict: bool,

    #[arg(long)]
    pub hide_district_name: bool,

    #[arg(long, value_delimiter = ',', default_value = "json,csv,tooltips")]
    pub formats: Vec<String>,

    /// Write plain files instead of a zip archive
    #[arg(long)]
    pub no_zip: bool,

    /// Validate only, do not write any output
    #[arg(long)]
    pub check: bool,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "compact", value_parser = ["compact", "json"])]
    pub log_format: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn gazetteer_path(&self) -> Option<&str> {
        self.gazetteer.as_deref()
    }

    fn strict_locations(&self) -> bool {
        self.strict
    }

    fn show_district_name(&self) -> bool {
        !self.hide_district_name
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.formats
            .iter()
            .filter_map(|f| OutputFormat::parse(f))
            .collect()
    }

    fn archive_name(&self) -> Option<&str> {
        if self.no_zip {
            None
        } else {
            Some("layers_output.zip")
        }
    }

    fn request_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.timeout_seconds))
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_sources("input", &self.inputs)?;
        validation::validate_path("output_path", &self.output_path)?;
        if let Some(gazetteer) = &self.gazetteer {
            validation::validate_path("gazetteer", gazetteer)?;
        }
        for format in &self.formats {
            validation::validate_one_of("formats", format, OutputFormat::NAMES)?;
        }
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        Ok(())
    }
}
