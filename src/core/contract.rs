//! The layer file format: a comma-separated file with exactly two
//! columns, one headed `Location` (case-sensitive, either position) and
//! one data column with any header.

use crate::domain::model::{LayerRow, ParsedLayer, LOCATION_HEADER};
use crate::utils::error::{LayerError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn parse_layer(source: &str, content: &[u8]) -> Result<ParsedLayer> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    // 欄位數量自行檢查，才能回報行號
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .trim(Trim::Fields)
        .from_reader(content);

    let headers = reader.headers()?.clone();
    let location_position = locate_location_column(source, &headers)?;
    let value_column = headers
        .get(1 - location_position)
        .unwrap_or_default()
        .to_string();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() != 2 {
            return Err(LayerError::contract(
                source,
                format!(
                    "line {} has {} field(s), expected exactly 2",
                    line,
                    record.len()
                ),
            ));
        }

        rows.push(LayerRow {
            line,
            location: record.get(location_position).unwrap_or_default().to_string(),
            value: record
                .get(1 - location_position)
                .unwrap_or_default()
                .to_string(),
        });
    }

    if rows.is_empty() {
        return Err(LayerError::contract(source, "the file has no data rows"));
    }

    tracing::debug!(
        "Parsed '{}': {} rows, value column '{}'",
        source,
        rows.len(),
        value_column
    );

    Ok(ParsedLayer {
        source: source.to_string(),
        value_column,
        location_position,
        rows,
    })
}

fn locate_location_column(source: &str, headers: &StringRecord) -> Result<usize> {
    if headers.is_empty() {
        return Err(LayerError::contract(source, "the file is empty"));
    }

    if headers.len() != 2 {
        let found: Vec<&str> = headers.iter().collect();
        return Err(LayerError::contract(
            source,
            format!(
                "expected exactly two columns, found {} ({})",
                headers.len(),
                found.join(", ")
            ),
        ));
    }

    let positions: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| *h == LOCATION_HEADER)
        .map(|(idx, _)| idx)
        .collect();

    match positions.as_slice() {
        [position] => Ok(*position),
        [] => {
            let near_miss = headers
                .iter()
                .find(|h| h.trim().eq_ignore_ascii_case(LOCATION_HEADER));
            let message = match near_miss {
                Some(header) => format!(
                    "column '{}' must be named exactly '{}'",
                    header, LOCATION_HEADER
                ),
                None => format!("no column named '{}'", LOCATION_HEADER),
            };
            Err(LayerError::contract(source, message))
        }
        _ => Err(LayerError::contract(
            source,
            format!("both columns are named '{}'", LOCATION_HEADER),
        )),
    }
}
