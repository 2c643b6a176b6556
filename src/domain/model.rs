use crate::utils::error::{exit_code_for, ErrorCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header that every layer file must carry, byte for byte.
pub const LOCATION_HEADER: &str = "Location";

pub const DEFAULT_LAYER_COLOR: &str = "#FF4500";
pub const DEFAULT_MARKER_ICON: &str = "🏞️";
pub const MARKER_ICONS: &[&str] = &[
    "📍", "⭐", "🏔️", "🏛️", "🏞️", "🌳", "🏨", "🎄", "🏠", "🚉", "🌊",
];

/// 省份預設配色，依 gazetteer 中省份出現順序循環使用
pub const PROVINCE_COLORS: &[&str] = &[
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692",
];

/// 原始輸入: 來源名稱與檔案內容
#[derive(Debug, Clone)]
pub struct RawLayer {
    pub source: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub location: String,
    pub value: String,
}

/// A file that passed the two-column / `Location` contract.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedLayer {
    pub source: String,
    pub value_column: String,
    /// Position of the `Location` column (0 or 1).
    pub location_position: usize,
    pub rows: Vec<LayerRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Choropleth,
    Markers,
}

impl From<ValueKind> for RenderMode {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Numeric => RenderMode::Choropleth,
            ValueKind::Text => RenderMode::Markers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub display_name: String,
    pub tooltip_label: String,
    pub visible: bool,
    pub tooltip_visible: bool,
    pub color: String,
    pub icon: String,
}

/// Per-source overrides for [`LayerStyle`], e.g. from `[[layers]]` in TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerOverride {
    pub source: String,
    pub display_name: Option<String>,
    pub tooltip_label: Option<String>,
    pub visible: Option<bool>,
    pub tooltip_visible: Option<bool>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceStyle {
    pub name: String,
    pub color: String,
    pub visible: bool,
}

/// `[[provinces]]` in TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvinceOverride {
    pub name: String,
    pub color: Option<String>,
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRow {
    pub line: u64,
    pub district: String,
    pub province: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationIssue {
    pub line: u64,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layer {
    pub source: String,
    pub value_column: String,
    pub kind: ValueKind,
    pub render_mode: RenderMode,
    pub style: LayerStyle,
    pub rows: Vec<MatchedRow>,
    pub issues: Vec<LocationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<NumericSummary>,
    pub province_counts: BTreeMap<String, usize>,
}

impl Layer {
    pub fn rows_for<'a>(&'a self, district: &'a str) -> impl Iterator<Item = &'a MatchedRow> + 'a {
        self.rows.iter().filter(move |row| row.district == district)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedLayer {
    pub source: String,
    pub category: ErrorCategory,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictTooltip {
    pub district: String,
    pub province: String,
    pub lines: Vec<String>,
}

impl DistrictTooltip {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub layers: Vec<Layer>,
    pub rejected: Vec<RejectedLayer>,
    pub tooltips: Vec<DistrictTooltip>,
}

impl TransformResult {
    pub fn exit_code(&self) -> i32 {
        exit_code_for(self.layers.len(), self.rejected.len())
    }
}

/// Serialized as `report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct LayerReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub gazetteer: &'a str,
    pub provinces: &'a [ProvinceStyle],
    pub layers: &'a [Layer],
    pub rejected: &'a [RejectedLayer],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub loaded: usize,
    pub rejected: usize,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        exit_code_for(self.loaded, self.rejected)
    }
}
