use crate::core::classify::parse_numeric;
use crate::domain::gazetteer::Gazetteer;
use crate::domain::model::{DistrictTooltip, Layer};

/// Hover text for every district that has something to show, in
/// gazetteer order.
pub fn build_tooltips(
    gazetteer: &Gazetteer,
    layers: &[Layer],
    show_district_name: bool,
) -> Vec<DistrictTooltip> {
    let mut tooltips = Vec::new();

    for district in gazetteer.districts() {
        let mut lines = Vec::new();
        if show_district_name {
            lines.push(format!("District: {}", district.name));
        }

        for layer in layers.iter().filter(|l| l.style.tooltip_visible) {
            let items: Vec<&str> = layer
                .rows_for(&district.name)
                .map(|row| row.value.as_str())
                .collect();
            let label = &layer.style.tooltip_label;

            match items.as_slice() {
                [] => {}
                [single] => lines.push(format!("{}: {}", label, format_value(single))),
                many => {
                    lines.push(format!("{}:", label));
                    for (idx, item) in many.iter().enumerate() {
                        lines.push(format!("  {}. {}", item_marker(idx), item));
                    }
                }
            }
        }

        if !lines.is_empty() {
            tooltips.push(DistrictTooltip {
                district: district.name.clone(),
                province: district.province.clone(),
                lines,
            });
        }
    }

    tooltips
}

/// Numbers get thousands separators and two decimals; text is unchanged.
pub fn format_value(value: &str) -> String {
    match parse_numeric(value) {
        Some(number) => format_thousands(number),
        None => value.to_string(),
    }
}

pub fn format_thousands(number: f64) -> String {
    let fixed = format!("{:.2}", number.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if number < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// a, b, c ... z, then 27, 28 ...
fn item_marker(idx: usize) -> String {
    if idx < 26 {
        ((b'a' + idx as u8) as char).to_string()
    } else {
        (idx + 1).to_string()
    }
}
