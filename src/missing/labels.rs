use serde::Deserialize;

use super::Axis;
use crate::data::model::{CellValue, Table};
use crate::error::{invalid, Result};

/// Where the display labels of an axis come from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LabelSpec {
    /// A column of the table (row labels) or a row-index entry (column labels).
    Reference(String),
    /// One label per item, coerced to text.
    Explicit(Vec<CellValue>),
}

impl LabelSpec {
    pub fn explicit<I, T>(labels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CellValue>,
    {
        LabelSpec::Explicit(labels.into_iter().map(Into::into).collect())
    }
}

/// Resolve the display labels of one axis.
///
/// Always returns exactly `axis_length` labels, or a validation error when
/// `spec` is present but neither an in-table reference nor of matching
/// length.
pub fn resolve_labels(
    table: &Table,
    spec: Option<&LabelSpec>,
    axis_length: usize,
    default_prefix: &str,
    axis: Axis,
) -> Result<Vec<String>> {
    let labels: Vec<String> = match spec {
        None => (0..axis_length)
            .map(|i| format!("{default_prefix}{i}"))
            .collect(),
        Some(LabelSpec::Reference(name)) => {
            let values: Vec<&CellValue> = match axis {
                Axis::Rows => match table.column_position(name) {
                    Some(col) => table.column_values(col).collect(),
                    None => return invalid!("no column named '{name}' to label rows with"),
                },
                Axis::Cols => match table.row_position(name) {
                    Some(row) => table.row(row).iter().collect(),
                    None => return invalid!("no row named '{name}' to label columns with"),
                },
            };
            values.into_iter().map(cell_label).collect()
        }
        Some(LabelSpec::Explicit(values)) => values.iter().map(cell_label).collect(),
    };

    if labels.len() != axis_length {
        return invalid!(
            "{axis} labels: got {} labels for {axis_length} {axis}",
            labels.len()
        );
    }
    Ok(labels)
}

fn cell_label(value: &CellValue) -> String {
    value.to_string().trim().to_string()
}
