use crate::core::contract::parse_layer;
use crate::core::layer::{build_layer, province_styles, source_file_name, LayerOptions};
use crate::core::tooltip::build_tooltips;
use crate::core::{ConfigProvider, Pipeline, RawLayer, Storage, TransformResult};
use crate::domain::gazetteer::Gazetteer;
use crate::domain::model::{Layer, LayerReport, RejectedLayer};
use crate::domain::ports::OutputFormat;
use crate::utils::error::{LayerError, Result};
use crate::utils::validation::is_remote_source;
use reqwest::Client;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const REPORT_FILE: &str = "report.json";
const TOOLTIPS_FILE: &str = "tooltips.csv";

pub struct LayerPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    gazetteer: Gazetteer,
}

impl<S: Storage, C: ConfigProvider> LayerPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let gazetteer = match config.gazetteer_path() {
            Some(path) => Gazetteer::from_file(path)?,
            None => Gazetteer::official(),
        };

        Ok(Self {
            storage,
            config,
            client: Client::new(),
            gazetteer,
        })
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        for (key, value) in self.config.request_headers() {
            request = request.header(key, value);
        }
        if let Some(timeout) = self.config.request_timeout() {
            request = request.timeout(timeout);
        }

        tracing::debug!("Fetching layer from: {}", url);
        let response = request.send().await?;
        tracing::debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            return Err(LayerError::SourceUnavailable {
                source_name: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn gazetteer_label(&self) -> &str {
        self.config.gazetteer_path().unwrap_or("official")
    }

    fn render_outputs(&self, result: &TransformResult) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();

        for format in self.config.output_formats() {
            match format {
                OutputFormat::Json => {
                    let provinces =
                        province_styles(&self.gazetteer, self.config.province_overrides());
                    let report = LayerReport {
                        generated_at: chrono::Utc::now(),
                        gazetteer: self.gazetteer_label(),
                        provinces: &provinces,
                        layers: &result.layers,
                        rejected: &result.rejected,
                    };
                    files.push((
                        REPORT_FILE.to_string(),
                        serde_json::to_vec_pretty(&report)?,
                    ));
                }
                OutputFormat::Csv => {
                    // 固定輸出檔名不可被圖層佔用
                    let mut used: HashSet<String> = [REPORT_FILE, TOOLTIPS_FILE]
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    for layer in &result.layers {
                        let name = unique_file_name(&layer.style.display_name, &mut used);
                        files.push((name, layer_csv(layer)?));
                    }
                }
                OutputFormat::Tooltips => {
                    let mut writer = csv::Writer::from_writer(Vec::new());
                    writer.write_record(["District", "Province", "Tooltip"])?;
                    for tooltip in &result.tooltips {
                        writer.write_record([
                            tooltip.district.as_str(),
                            tooltip.province.as_str(),
                            tooltip.text().as_str(),
                        ])?;
                    }
                    files.push((TOOLTIPS_FILE.to_string(), into_bytes(writer)?));
                }
            }
        }

        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LayerPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawLayer>> {
        let mut raw_layers = Vec::new();

        for source in self.config.inputs() {
            let content = if is_remote_source(source) {
                self.fetch_remote(source).await?
            } else {
                self.storage.read_file(source).await?
            };

            tracing::debug!("Read {} bytes from {}", content.len(), source);
            raw_layers.push(RawLayer {
                source: source.clone(),
                content,
            });
        }

        tracing::info!("📥 Extracted {} layer file(s)", raw_layers.len());
        Ok(raw_layers)
    }

    async fn transform(&self, data: Vec<RawLayer>) -> Result<TransformResult> {
        let mut layers: Vec<Layer> = Vec::new();
        let mut rejected = Vec::new();
        let mut seen = HashSet::new();

        for raw in data {
            if !seen.insert(source_file_name(&raw.source).to_string()) {
                tracing::warn!(
                    "Skipping '{}': a file named '{}' is already loaded",
                    raw.source,
                    source_file_name(&raw.source)
                );
                continue;
            }

            let options = LayerOptions {
                strict_locations: self.config.strict_locations(),
                style_override: self.config.layer_override(&raw.source),
            };

            let built = parse_layer(&raw.source, &raw.content)
                .and_then(|parsed| build_layer(parsed, &self.gazetteer, &options));

            match built {
                Ok(layer) => layers.push(layer),
                Err(e) => {
                    tracing::error!("❌ Rejected '{}': {}", raw.source, e);
                    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                    rejected.push(RejectedLayer {
                        source: raw.source,
                        category: e.category(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let tooltips = build_tooltips(&self.gazetteer, &layers, self.config.show_district_name());

        tracing::info!(
            "🔧 Transform complete: {} layer(s) loaded, {} rejected, {} tooltip(s)",
            layers.len(),
            rejected.len(),
            tooltips.len()
        );

        Ok(TransformResult {
            layers,
            rejected,
            tooltips,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let files = self.render_outputs(&result)?;

        match self.config.archive_name() {
            Some(archive) => {
                tracing::debug!("Creating ZIP file with {} files", files.len());

                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    for (name, data) in &files {
                        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                        zip.write_all(data)?;
                    }
                    zip.finish()?.into_inner()
                };

                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(archive, &zip_data).await?;

                let output_path = format!("{}/{}", self.config.output_path(), archive);
                tracing::info!("📦 Layers saved to: {}", output_path);
                Ok(output_path)
            }
            None => {
                for (name, data) in &files {
                    self.storage.write_file(name, data).await?;
                }
                tracing::info!(
                    "📁 {} file(s) saved to: {}",
                    files.len(),
                    self.config.output_path()
                );
                Ok(self.config.output_path().to_string())
            }
        }
    }
}

/// `Location,<value column>,Province`, one row per matched location.
fn layer_csv(layer: &Layer) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Location", layer.value_column.as_str(), "Province"])?;
    for row in &layer.rows {
        writer.write_record([
            row.district.as_str(),
            row.value.as_str(),
            row.province.as_str(),
        ])?;
    }
    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| LayerError::IoError(e.into_error()))
}

/// 以顯示名稱產生檔名，只保留安全字元並避免重名
fn unique_file_name(display_name: &str, used: &mut HashSet<String>) -> String {
    let slug: String = display_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = if slug.trim_matches('_').is_empty() {
        "layer".to_string()
    } else {
        slug
    };

    let mut candidate = format!("{}.csv", slug);
    let mut counter = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}.csv", slug, counter);
        counter += 1;
    }
    candidate
}
