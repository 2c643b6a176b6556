use crate::core::classify::detect_kind;
use crate::domain::gazetteer::Gazetteer;
use crate::domain::model::{
    Layer, LayerOverride, LayerStyle, LocationIssue, MatchedRow, NumericSummary, ParsedLayer,
    ProvinceOverride, ProvinceStyle, RenderMode, ValueKind, DEFAULT_LAYER_COLOR,
    DEFAULT_MARKER_ICON, PROVINCE_COLORS,
};
use crate::utils::error::{LayerError, Result};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct LayerOptions<'a> {
    /// Reject the whole layer when any location is not an official name.
    pub strict_locations: bool,
    pub style_override: Option<&'a LayerOverride>,
}

/// Last path segment of a file path or URL, without query string.
pub fn source_file_name(source: &str) -> &str {
    let without_query = source.split(['?', '#']).next().unwrap_or(source);
    without_query
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(without_query)
}

pub fn default_style(source: &str, value_column: &str) -> LayerStyle {
    let file_name = source_file_name(source);
    let display_name = file_name
        .strip_suffix(".csv")
        .or_else(|| file_name.strip_suffix(".CSV"))
        .unwrap_or(file_name)
        .to_string();

    let tooltip_label = if value_column.trim().is_empty() {
        "Value".to_string()
    } else {
        value_column.replace('_', " ")
    };

    LayerStyle {
        display_name,
        tooltip_label,
        visible: true,
        tooltip_visible: true,
        color: DEFAULT_LAYER_COLOR.to_string(),
        icon: DEFAULT_MARKER_ICON.to_string(),
    }
}

impl LayerStyle {
    pub fn apply(&mut self, overrides: &LayerOverride) {
        if let Some(name) = &overrides.display_name {
            self.display_name = name.clone();
        }
        if let Some(label) = &overrides.tooltip_label {
            self.tooltip_label = label.clone();
        }
        if let Some(visible) = overrides.visible {
            self.visible = visible;
        }
        if let Some(tooltip_visible) = overrides.tooltip_visible {
            self.tooltip_visible = tooltip_visible;
        }
        if let Some(color) = &overrides.color {
            self.color = color.clone();
        }
        if let Some(icon) = &overrides.icon {
            self.icon = icon.clone();
        }
    }
}

/// One style per gazetteer province, palette colors unless overridden.
pub fn province_styles(gazetteer: &Gazetteer, overrides: &[ProvinceOverride]) -> Vec<ProvinceStyle> {
    for unknown in overrides
        .iter()
        .filter(|o| !gazetteer.provinces().contains(&o.name.as_str()))
    {
        tracing::warn!("Province override '{}' matches no province", unknown.name);
    }

    gazetteer
        .provinces()
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut style = ProvinceStyle {
                name: name.to_string(),
                color: PROVINCE_COLORS[idx % PROVINCE_COLORS.len()].to_string(),
                visible: true,
            };
            if let Some(o) = overrides.iter().find(|o| o.name == name) {
                if let Some(color) = &o.color {
                    style.color = color.clone();
                }
                if let Some(visible) = o.visible {
                    style.visible = visible;
                }
            }
            style
        })
        .collect()
}

/// Join a parsed file to the gazetteer and classify its values.
pub fn build_layer(
    parsed: ParsedLayer,
    gazetteer: &Gazetteer,
    options: &LayerOptions<'_>,
) -> Result<Layer> {
    let mut rows = Vec::with_capacity(parsed.rows.len());
    let mut issues = Vec::new();

    for row in parsed.rows {
        match gazetteer.lookup(&row.location) {
            Some(district) => rows.push(MatchedRow {
                line: row.line,
                district: district.name.clone(),
                province: district.province.clone(),
                value: row.value,
            }),
            None => {
                let hint = gazetteer.case_hint(&row.location).map(str::to_string);
                tracing::warn!(
                    "'{}' line {}: unknown location '{}'{}",
                    parsed.source,
                    row.line,
                    row.location,
                    hint.as_deref()
                        .map(|h| format!(" (did you mean '{}'?)", h))
                        .unwrap_or_default()
                );
                issues.push(LocationIssue {
                    line: row.line,
                    location: row.location,
                    hint,
                });
            }
        }
    }

    if options.strict_locations && !issues.is_empty() {
        return Err(LayerError::UnknownLocations {
            source_name: parsed.source,
            count: issues.len(),
        });
    }

    if rows.is_empty() {
        return Err(LayerError::NoMatchingLocations {
            source_name: parsed.source,
        });
    }

    log_duplicates(&parsed.source, &rows);

    // 分類只看成功對應到行政區的資料
    let kind = detect_kind(rows.iter().map(|r| r.value.as_str()));
    let summary = match kind {
        ValueKind::Numeric => NumericSummary::from_values(rows.iter().map(|r| r.value.as_str())),
        ValueKind::Text => None,
    };

    let mut province_counts = BTreeMap::new();
    for row in &rows {
        *province_counts.entry(row.province.clone()).or_insert(0) += 1;
    }

    let mut style = default_style(&parsed.source, &parsed.value_column);
    if let Some(overrides) = options.style_override {
        style.apply(overrides);
    }

    tracing::info!(
        "🗺️ Layer '{}': {} matched, {} unknown, {:?} → {:?}",
        style.display_name,
        rows.len(),
        issues.len(),
        kind,
        RenderMode::from(kind)
    );

    Ok(Layer {
        source: parsed.source,
        value_column: parsed.value_column,
        kind,
        render_mode: RenderMode::from(kind),
        style,
        rows,
        issues,
        summary,
        province_counts,
    })
}

fn log_duplicates(source: &str, rows: &[MatchedRow]) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.district.as_str()).or_insert(0) += 1;
    }
    for (district, count) in counts.into_iter().filter(|(_, c)| *c > 1) {
        tracing::debug!("'{}': {} rows for district {}", source, count, district);
    }
}
