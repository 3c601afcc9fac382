use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::Axis;
use crate::config::DisplayConfig;
use crate::data::model::{MissingMask, Table};
use crate::error::{invalid, Error, Result};

// ---------------------------------------------------------------------------
// FilterSpec – inclusion rule over a missingness ratio
// ---------------------------------------------------------------------------

/// Decides whether a row or column is kept, given its missing ratio.
#[derive(Clone, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub enum FilterSpec {
    /// Keep ratios in `[low, high]`, both ends inclusive.
    Interval { low: f64, high: f64 },
    Predicate(Arc<dyn Fn(f64) -> bool + Send + Sync>),
}

impl FilterSpec {
    /// Build an interval spec, checking both bounds lie in `[0, 1]`.
    pub fn interval(low: f64, high: f64) -> Result<Self> {
        for bound in [low, high] {
            if !(0.0..=1.0).contains(&bound) {
                return invalid!("filter bounds must lie in [0, 1], got ({low}, {high})");
            }
        }
        if low > high {
            return invalid!("filter lower bound {low} exceeds upper bound {high}");
        }
        Ok(FilterSpec::Interval { low, high })
    }

    /// Build an interval spec from a `[low, high]` slice.
    pub fn from_bounds(bounds: &[f64]) -> Result<Self> {
        match *bounds {
            [low, high] => Self::interval(low, high),
            _ => invalid!(
                "filter spec must have exactly two bounds, got {}",
                bounds.len()
            ),
        }
    }

    pub fn predicate<F>(keep: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        log::debug!("custom filter predicate probe(0.5) = {}", keep(0.5));
        FilterSpec::Predicate(Arc::new(keep))
    }

    /// Keep everything.
    pub fn everything() -> Self {
        FilterSpec::Interval { low: 0.0, high: 1.0 }
    }

    /// Keep anything with at least one missing cell.
    pub fn any_missing() -> Self {
        FilterSpec::Interval {
            low: f64::EPSILON,
            high: 1.0,
        }
    }

    /// Default spec for an axis: keep all items while the axis is small
    /// enough to display, otherwise drop items with no missing cells.
    pub fn default_for(axis: Axis, axis_length: usize, display: &DisplayConfig) -> Self {
        if axis_length <= display.threshold(axis) {
            Self::everything()
        } else {
            Self::any_missing()
        }
    }

    pub fn keeps(&self, ratio: f64) -> bool {
        match self {
            FilterSpec::Interval { low, high } => *low <= ratio && ratio <= *high,
            FilterSpec::Predicate(keep) => keep(ratio),
        }
    }
}

impl TryFrom<Vec<f64>> for FilterSpec {
    type Error = Error;

    fn try_from(bounds: Vec<f64>) -> Result<Self> {
        Self::from_bounds(&bounds)
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Interval { low, high } => write!(f, "Interval[{low}, {high}]"),
            FilterSpec::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Frequencies and filtering
// ---------------------------------------------------------------------------

/// Fraction of missing cells in each row, `count / num_cols`.
pub fn row_frequencies(mask: &MissingMask) -> Vec<f64> {
    ratios(&mask.row_counts(), mask.num_cols())
}

/// Fraction of missing cells in each column, `count / num_rows`.
pub fn col_frequencies(mask: &MissingMask) -> Vec<f64> {
    ratios(&mask.col_counts(), mask.num_rows())
}

fn ratios(counts: &[usize], axis_length: usize) -> Vec<f64> {
    if axis_length == 0 {
        return vec![0.0; counts.len()];
    }
    counts
        .iter()
        .map(|&c| c as f64 / axis_length as f64)
        .collect()
}

/// Flag every item whose ratio `spec` keeps.
pub fn keep_mask(frequencies: &[f64], spec: &FilterSpec) -> Vec<bool> {
    frequencies.iter().map(|&f| spec.keeps(f)).collect()
}

/// Result of pruning a table by row and column missingness.
///
/// Both frequency vectors are measured on the unfiltered table.
#[derive(Debug, Clone)]
pub struct Filtered {
    pub table: Table,
    pub keep_rows: Vec<bool>,
    pub keep_cols: Vec<bool>,
    pub row_freq: Vec<f64>,
    pub col_freq: Vec<f64>,
}

impl Filtered {
    /// Row frequencies of the kept rows, in table order.
    pub fn kept_row_freq(&self) -> Vec<f64> {
        select(&self.row_freq, &self.keep_rows)
    }

    /// Column frequencies of the kept columns, in table order.
    pub fn kept_col_freq(&self) -> Vec<f64> {
        select(&self.col_freq, &self.keep_cols)
    }
}

/// Keep the items of `values` whose flag is set.
pub fn select<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, &k)| k)
        .map(|(v, _)| v.clone())
        .collect()
}

/// Prune `table` to the rows and columns kept by the two specs.
///
/// Ratios are computed once on the input, so the row and column filters are
/// independent of each other.
pub fn filter(table: &Table, row_spec: &FilterSpec, col_spec: &FilterSpec) -> Filtered {
    let mask = table.missing_mask();
    let row_freq = row_frequencies(&mask);
    let col_freq = col_frequencies(&mask);
    let keep_rows = keep_mask(&row_freq, row_spec);
    let keep_cols = keep_mask(&col_freq, col_spec);

    let filtered = table.select(&keep_rows, &keep_cols);
    log::debug!(
        "filter {:?} x {:?}: {:?} -> {:?}",
        row_spec,
        col_spec,
        table.shape(),
        filtered.shape()
    );

    Filtered {
        table: filtered,
        keep_rows,
        keep_cols,
        row_freq,
        col_freq,
    }
}
