use crate::core::ConfigProvider;
use crate::domain::model::{LayerOverride, ProvinceOverride, MARKER_ICONS};
use crate::domain::ports::OutputFormat;
use crate::utils::error::{LayerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    pub source: SourceConfig,
    pub gazetteer: Option<GazetteerConfig>,
    pub validation: Option<ValidationConfig>,
    pub tooltip: Option<TooltipConfig>,
    pub load: LoadConfig,
    #[serde(default)]
    pub layers: Vec<LayerOverride>,
    #[serde(default)]
    pub provinces: Vec<ProvinceOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub inputs: Vec<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub strict_locations: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TooltipConfig {
    pub show_district_name: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Option<Vec<String>>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LayerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LayerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("project.name", &self.project.name)?;
        validation::validate_sources("source.inputs", &self.source.inputs)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(path) = self.gazetteer.as_ref().and_then(|g| g.path.as_deref()) {
            validation::validate_path("gazetteer.path", path)?;
        }

        if let Some(formats) = &self.load.output_formats {
            for format in formats {
                validation::validate_one_of("load.output_formats", format, OutputFormat::NAMES)?;
            }
        }

        if let Some(filename) = self
            .load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
        {
            validation::validate_file_extensions(
                "load.compression.filename",
                &[filename.to_string()],
                &["zip"],
            )?;
        }

        for layer in &self.layers {
            validation::validate_non_empty_string("layers.source", &layer.source)?;
            if !self.source.inputs.contains(&layer.source) {
                return Err(LayerError::InvalidConfigValueError {
                    field: "layers.source".to_string(),
                    value: layer.source.clone(),
                    reason: "Not listed in source.inputs".to_string(),
                });
            }
            if let Some(color) = &layer.color {
                validation::validate_hex_color("layers.color", color)?;
            }
            if let Some(icon) = &layer.icon {
                validation::validate_one_of("layers.icon", icon, MARKER_ICONS)?;
            }
        }

        for province in &self.provinces {
            validation::validate_non_empty_string("provinces.name", &province.name)?;
            if let Some(color) = &province.color {
                validation::validate_hex_color("provinces.color", color)?;
            }
        }

        Ok(())
    }

    pub fn compression_enabled(&self) -> bool {
        self.load.compression.as_ref().map(|c| c.enabled).unwrap_or(true)
    }
}

impl ConfigProvider for TomlConfig {
    fn inputs(&self) -> &[String] {
        &self.source.inputs
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn gazetteer_path(&self) -> Option<&str> {
        self.gazetteer.as_ref().and_then(|g| g.path.as_deref())
    }

    fn strict_locations(&self) -> bool {
        self.validation
            .as_ref()
            .and_then(|v| v.strict_locations)
            .unwrap_or(false)
    }

    fn show_district_name(&self) -> bool {
        self.tooltip
            .as_ref()
            .and_then(|t| t.show_district_name)
            .unwrap_or(true)
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        match &self.load.output_formats {
            Some(formats) => formats.iter().filter_map(|f| OutputFormat::parse(f)).collect(),
            None => OutputFormat::all(),
        }
    }

    fn archive_name(&self) -> Option<&str> {
        if !self.compression_enabled() {
            return None;
        }
        Some(
            self.load
                .compression
                .as_ref()
                .and_then(|c| c.filename.as_deref())
                .unwrap_or("layers_output.zip"),
        )
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        self.source
            .headers
            .as_ref()
            .map(|headers| {
                headers
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn layer_override(&self, source: &str) -> Option<&LayerOverride> {
        self.layers.iter().find(|layer| layer.source == source)
    }

    fn province_overrides(&self) -> &[ProvinceOverride] {
        &self.provinces
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
