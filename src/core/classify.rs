use crate::domain::model::{NumericSummary, ValueKind};

/// Finite numbers only; `inf`, `NaN` and blanks count as text.
pub fn parse_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Numeric when every value parses, text otherwise.
pub fn detect_kind<'a, I>(values: I) -> ValueKind
where
    I: IntoIterator<Item = &'a str>,
{
    if values.into_iter().all(|v| parse_numeric(v).is_some()) {
        ValueKind::Numeric
    } else {
        ValueKind::Text
    }
}

impl NumericSummary {
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let numbers: Vec<f64> = values.into_iter().filter_map(parse_numeric).collect();
        if numbers.is_empty() {
            return None;
        }

        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;

        Some(Self {
            count: numbers.len(),
            min,
            max,
            mean,
        })
    }
}
