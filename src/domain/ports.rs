use crate::domain::model::{LayerOverride, ProvinceOverride, RawLayer, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Tooltips,
}

impl OutputFormat {
    pub const NAMES: &'static [&'static str] = &["json", "csv", "tooltips"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "tooltips" => Some(OutputFormat::Tooltips),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![OutputFormat::Json, OutputFormat::Csv, OutputFormat::Tooltips]
    }
}

pub trait ConfigProvider: Send + Sync {
    fn inputs(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn gazetteer_path(&self) -> Option<&str>;
    fn strict_locations(&self) -> bool;

    fn show_district_name(&self) -> bool {
        true
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        OutputFormat::all()
    }

    /// `Some(name)` zips every output file into one archive.
    fn archive_name(&self) -> Option<&str> {
        Some("layers_output.zip")
    }

    fn request_timeout(&self) -> Option<Duration> {
        None
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn layer_override(&self, _source: &str) -> Option<&LayerOverride> {
        None
    }

    fn province_overrides(&self) -> &[ProvinceOverride] {
        &[]
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawLayer>>;
    async fn transform(&self, data: Vec<RawLayer>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
