use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Source '{source_name}' is unavailable (HTTP {status})")]
    SourceUnavailable { source_name: String, status: u16 },

    #[error("'{source_name}' does not follow the CSV format: {message}")]
    ContractViolation { source_name: String, message: String },

    #[error("'{source_name}' has {count} location(s) that are not official district names")]
    UnknownLocations { source_name: String, count: usize },

    #[error("No matching locations were found in '{source_name}'")]
    NoMatchingLocations { source_name: String },

    #[error("Gazetteer error: {message}")]
    GazetteerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Contract,
    Data,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LayerError {
    pub fn contract(source_name: &str, message: impl Into<String>) -> Self {
        LayerError::ContractViolation {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LayerError::ConfigError { .. }
            | LayerError::ConfigValidationError { .. }
            | LayerError::InvalidConfigValueError { .. }
            | LayerError::MissingConfigError { .. }
            | LayerError::GazetteerError { .. } => ErrorCategory::Configuration,
            LayerError::ContractViolation { .. } | LayerError::CsvError(_) => {
                ErrorCategory::Contract
            }
            LayerError::UnknownLocations { .. } | LayerError::NoMatchingLocations { .. } => {
                ErrorCategory::Data
            }
            LayerError::HttpError(_) | LayerError::SourceUnavailable { .. } => {
                ErrorCategory::Network
            }
            LayerError::ZipError(_)
            | LayerError::IoError(_)
            | LayerError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data | ErrorCategory::Contract | ErrorCategory::Network => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 1 設定或網路錯誤 (沒有任何圖層載入)，3 系統錯誤
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration
            | ErrorCategory::Network
            | ErrorCategory::Contract
            | ErrorCategory::Data => 1,
            ErrorCategory::System => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LayerError::ContractViolation {
                source_name,
                message,
            } => format!("File '{}' cannot be used as a map layer: {}", source_name, message),
            LayerError::UnknownLocations { source_name, count } => format!(
                "File '{}' contains {} unrecognised district name(s)",
                source_name, count
            ),
            LayerError::NoMatchingLocations { source_name } => format!(
                "None of the locations in '{}' match an official district",
                source_name
            ),
            LayerError::SourceUnavailable {
                source_name,
                status,
            } => format!("Could not download '{}' (HTTP {})", source_name, status),
            LayerError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LayerError::ContractViolation { .. } | LayerError::CsvError(_) => {
                "Use exactly two columns, one of them named 'Location' (case-sensitive)"
            }
            LayerError::UnknownLocations { .. } | LayerError::NoMatchingLocations { .. } => {
                "Use the official English district names, e.g. 'Kathmandu', 'Solukhumbu'"
            }
            LayerError::HttpError(_) | LayerError::SourceUnavailable { .. } => {
                "Check the URL and that the file is publicly downloadable"
            }
            LayerError::GazetteerError { .. } => {
                "The gazetteer CSV needs 'District' and 'Province' columns"
            }
            LayerError::ConfigError { .. }
            | LayerError::ConfigValidationError { .. }
            | LayerError::InvalidConfigValueError { .. }
            | LayerError::MissingConfigError { .. } => {
                "Review the command line arguments or the TOML configuration"
            }
            LayerError::IoError(_) => "Check that the path exists and is readable/writable",
            LayerError::ZipError(_) | LayerError::SerializationError(_) => {
                "Retry with --no-zip or report the problem"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LayerError>;

/// 0 全部成功，2 部分檔案被拒，1 沒有任何圖層
pub fn exit_code_for(loaded: usize, rejected: usize) -> i32 {
    match (loaded, rejected) {
        (0, _) => 1,
        (_, 0) => 0,
        _ => 2,
    }
}
