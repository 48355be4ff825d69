//! Layout-resolved grid shared by the console and spreadsheet sinks.

use serde_json::Value;

use crate::materials::tools::catalogue::PropertyDescriptor;
use crate::materials::tools::record::{Field, MISSING_TEXT, Record};

/// Caption of the label column in property-major grids.
pub const LABEL_HEADER: &str = "Property";

/// Row/column orientation of a [`ComparisonMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One row per entity under a row of property labels (listing).
    EntityMajor,
    /// One row per property, one column per entity (comparison).
    PropertyMajor,
}

impl Layout {
    /// Comparison layout is used only when the caller asked for several
    /// specific identifiers and more than one record came back.
    pub fn select(requested_ids: usize, record_count: usize) -> Self {
        if requested_ids >= 2 && record_count >= 2 {
            Layout::PropertyMajor
        } else {
            Layout::EntityMajor
        }
    }
}

/// Grid of display strings ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMatrix {
    layout: Layout,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ComparisonMatrix {
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Property-major: `Property` followed by one caption per entity.
    /// Entity-major: the property labels.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Body rows, each as wide as [`ComparisonMatrix::header`].
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// `(rows, columns)`. Property-major grids count property rows only, so a
    /// P-property, N-entity comparison is `P × (N + 1)`; entity-major grids
    /// count their label row, giving `(N + 1) × P`.
    pub fn shape(&self) -> (usize, usize) {
        match self.layout {
            Layout::PropertyMajor => (self.rows.len(), self.header.len()),
            Layout::EntityMajor => (self.rows.len() + 1, self.header.len()),
        }
    }
}

/// Lays `records` out against `catalogue`.
pub fn build_matrix(
    records: &[Record],
    catalogue: &[PropertyDescriptor],
    layout: Layout,
) -> ComparisonMatrix {
    let (header, rows) = match layout {
        Layout::PropertyMajor => {
            let mut header = Vec::with_capacity(records.len() + 1);
            header.push(LABEL_HEADER.to_string());
            header.extend(records.iter().map(Record::header));

            let rows = catalogue
                .iter()
                .map(|descriptor| {
                    let mut row = Vec::with_capacity(records.len() + 1);
                    row.push(descriptor.label.to_string());
                    row.extend(
                        records
                            .iter()
                            .map(|record| format_cell(record.get(descriptor.key), descriptor)),
                    );
                    row
                })
                .collect();
            (header, rows)
        }
        Layout::EntityMajor => {
            let header = catalogue
                .iter()
                .map(|descriptor| descriptor.label.to_string())
                .collect();
            let rows = records
                .iter()
                .map(|record| {
                    catalogue
                        .iter()
                        .map(|descriptor| format_cell(record.get(descriptor.key), descriptor))
                        .collect()
                })
                .collect();
            (header, rows)
        }
    };

    ComparisonMatrix {
        layout,
        header,
        rows,
    }
}

/// Display string for one record slot.
pub fn format_cell(field: &Field, descriptor: &PropertyDescriptor) -> String {
    let value = match field {
        Field::Missing => return MISSING_TEXT.to_string(),
        Field::Present(value) => value,
    };

    match value {
        Value::Null => MISSING_TEXT.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(number) => match (number.is_f64(), number.as_f64()) {
            (true, Some(float)) => format!(
                "{}{}",
                format_significant(float, descriptor.significant_digits),
                descriptor.unit
            ),
            _ => format!("{number}{}", descriptor.unit),
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Formats `value` with `digits` significant digits the way C's `%g` does:
/// fixed notation for moderate exponents, scientific otherwise, trailing
/// zeros removed. `2.34567` → `2.346`, `1050000.0` → `1.05e+06`.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        let zero = if value.is_sign_negative() { "-0" } else { "0" };
        return zero.to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        let infinity = if value > 0.0 { "inf" } else { "-inf" };
        return infinity.to_string();
    }

    let digits = digits.max(1);
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}"))
    }
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}
