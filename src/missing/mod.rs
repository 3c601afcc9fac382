//! Missingness engine: everything between a loaded table and a figure.
//!
//! ```text
//!   Table ──► labels ──► filter ──► grouping ──► layout ──► ticks
//!             resolve    prune by    reorder +    panel      which tick
//!             names      frequency   aggregate    extents    labels stay
//! ```
//!
//! Every stage returns new values; the input table is never modified.

use std::fmt;

use crate::data::model::Table;
use crate::error::{Error, Result};

pub mod filter;
pub mod grouping;
pub mod labels;
pub mod layout;
pub mod ticks;

/// One of the two table axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Cols,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Rows => f.write_str("rows"),
            Axis::Cols => f.write_str("columns"),
        }
    }
}

/// Pairwise co-missingness between columns. Not implemented.
pub fn pairwise_comissingness(_table: &Table) -> Result<Vec<Vec<f64>>> {
    Err(Error::Unsupported("pairwise co-missingness"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairwise_is_unsupported() {
        let table = Table::new(vec!["a".into()], vec![]).unwrap();
        assert!(matches!(
            pairwise_comissingness(&table),
            Err(Error::Unsupported(_))
        ));
    }
}
