use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
///
/// `Null` and NaN floats are the missing markers. The same type doubles as a
/// group label, so it is totally ordered and hashable. Equality, ordering and
/// hashing all agree: every NaN is one value and `-0.0` equals `0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

// -- Manual Eq/Ord so group labels can live in sorted sets --

/// Collapse the float values that compare equal onto one representation.
fn canonical_float(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => canonical_float(*a).total_cmp(&canonical_float(*b)),
            (String(a), String(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => canonical_float(*f).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

impl CellValue {
    /// The same value with `-0.0` and NaN payloads in their canonical form,
    /// so equal values also display alike.
    pub fn normalized(&self) -> CellValue {
        match self {
            CellValue::Float(v) => CellValue::Float(canonical_float(*v)),
            other => other.clone(),
        }
    }

    /// Whether this cell counts as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered, row-major table of cells.
///
/// `original_rows` / `original_cols` record where each current row and
/// column sat in the table as first constructed, so they survive selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column headers, one per column.
    pub columns: Vec<String>,
    /// Row identifiers, one per row.
    pub index: Vec<String>,
    cells: Vec<Vec<CellValue>>,
    original_rows: Vec<usize>,
    original_cols: Vec<usize>,
}

impl Table {
    /// Build a table with a default `0..n` row index.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let index = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::with_index(columns, index, rows)
    }

    /// Build a table with explicit row identifiers.
    ///
    /// Fails when any row is ragged or the index length differs from the
    /// row count.
    pub fn with_index(
        columns: Vec<String>,
        index: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        if index.len() != rows.len() {
            return invalid!(
                "row index has {} entries but table has {} rows",
                index.len(),
                rows.len()
            );
        }
        if let Some((r, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return invalid!(
                "input must be a 2D table: row {r} has {} cells, expected {}",
                row.len(),
                columns.len()
            );
        }
        Ok(Table {
            original_rows: (0..rows.len()).collect(),
            original_cols: (0..columns.len()).collect(),
            columns,
            index,
            cells: rows,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.cells.len()
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_cols())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.columns.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.cells[row][col]
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        &self.cells[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row_position(&self, id: &str) -> Option<usize> {
        self.index.iter().position(|i| i == id)
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().map(move |row| &row[col])
    }

    /// Cloned values of the column called `name`.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<CellValue>> {
        let col = self.column_position(name)?;
        Some(self.column_values(col).cloned().collect())
    }

    /// Original (construction-time) position of each current row.
    pub fn original_rows(&self) -> &[usize] {
        &self.original_rows
    }

    /// Original (construction-time) position of each current column.
    pub fn original_cols(&self) -> &[usize] {
        &self.original_cols
    }

    /// Keep the rows whose flag is set. `keep` must have one flag per row.
    pub fn select_rows(&self, keep: &[bool]) -> Table {
        debug_assert_eq!(keep.len(), self.num_rows());
        let kept = |i: &usize| keep[*i];
        let rows: Vec<usize> = (0..self.num_rows()).filter(kept).collect();
        Table {
            columns: self.columns.clone(),
            index: rows.iter().map(|&r| self.index[r].clone()).collect(),
            cells: rows.iter().map(|&r| self.cells[r].clone()).collect(),
            original_rows: rows.iter().map(|&r| self.original_rows[r]).collect(),
            original_cols: self.original_cols.clone(),
        }
    }

    /// Keep the columns whose flag is set. `keep` must have one flag per column.
    pub fn select_cols(&self, keep: &[bool]) -> Table {
        debug_assert_eq!(keep.len(), self.num_cols());
        let cols: Vec<usize> = (0..self.num_cols()).filter(|&c| keep[c]).collect();
        Table {
            columns: cols.iter().map(|&c| self.columns[c].clone()).collect(),
            index: self.index.clone(),
            cells: self
                .cells
                .iter()
                .map(|row| cols.iter().map(|&c| row[c].clone()).collect())
                .collect(),
            original_rows: self.original_rows.clone(),
            original_cols: cols.iter().map(|&c| self.original_cols[c]).collect(),
        }
    }

    /// Sub-table at the intersection of kept rows and kept columns.
    pub fn select(&self, keep_rows: &[bool], keep_cols: &[bool]) -> Table {
        self.select_rows(keep_rows).select_cols(keep_cols)
    }

    /// Boolean missingness indicator for every cell.
    pub fn missing_mask(&self) -> MissingMask {
        MissingMask {
            num_rows: self.num_rows(),
            num_cols: self.num_cols(),
            flags: self
                .cells
                .iter()
                .flat_map(|row| row.iter().map(CellValue::is_missing))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// MissingMask – derived boolean matrix
// ---------------------------------------------------------------------------

/// `true` at (r, c) iff the table cell at (r, c) is missing.
///
/// Masks are never edited in place; every transformation yields a new mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMask {
    num_rows: usize,
    num_cols: usize,
    flags: Vec<bool>,
}

impl MissingMask {
    /// Build a mask from row-major flags.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let num_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != num_cols) {
            return invalid!("missing mask rows must all have the same length");
        }
        Ok(MissingMask {
            num_rows: rows.len(),
            num_cols,
            flags: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.flags[row * self.num_cols + col]
    }

    pub fn total_missing(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Missing cell count of every row.
    pub fn row_counts(&self) -> Vec<usize> {
        if self.num_cols == 0 {
            return vec![0; self.num_rows];
        }
        self.flags
            .chunks(self.num_cols)
            .map(|row| row.iter().filter(|&&f| f).count())
            .collect()
    }

    /// Missing cell count of every column.
    pub fn col_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_cols];
        for (i, &f) in self.flags.iter().enumerate() {
            if f {
                counts[i % self.num_cols] += 1;
            }
        }
        counts
    }

    /// Sub-mask at the intersection of kept rows and kept columns.
    pub fn select(&self, keep_rows: &[bool], keep_cols: &[bool]) -> MissingMask {
        let rows: Vec<usize> = (0..self.num_rows).filter(|&r| keep_rows[r]).collect();
        let cols: Vec<usize> = (0..self.num_cols).filter(|&c| keep_cols[c]).collect();
        self.gather(&rows, &cols)
    }

    /// Reorder rows so that new row `i` is old row `order[i]`.
    pub fn permute_rows(&self, order: &[usize]) -> MissingMask {
        let cols: Vec<usize> = (0..self.num_cols).collect();
        self.gather(order, &cols)
    }

    /// Reorder columns so that new column `j` is old column `order[j]`.
    pub fn permute_cols(&self, order: &[usize]) -> MissingMask {
        let rows: Vec<usize> = (0..self.num_rows).collect();
        self.gather(&rows, order)
    }

    fn gather(&self, rows: &[usize], cols: &[usize]) -> MissingMask {
        MissingMask {
            num_rows: rows.len(),
            num_cols: cols.len(),
            flags: rows
                .iter()
                .flat_map(|&r| cols.iter().map(move |&c| self.get(r, c)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal_table() -> Table {
        let rows = (0..4)
            .map(|r| {
                (0..3)
                    .map(|c| {
                        if r == c {
                            CellValue::Null
                        } else {
                            CellValue::Integer((r * 3 + c) as i64)
                        }
                    })
                    .collect()
            })
            .collect();
        Table::new(vec!["a".into(), "b".into(), "c".into()], rows).unwrap()
    }

    #[test]
    fn nan_and_null_are_missing() {
        assert!(CellValue::Null.is_missing());
        assert!(CellValue::Float(f64::NAN).is_missing());
        assert!(!CellValue::Float(0.0).is_missing());
        assert!(!CellValue::from("").is_missing());
    }

    #[test]
    fn float_equality_matches_ordering() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        fn hash_of(v: &CellValue) -> u64 {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        }

        let nan = CellValue::Float(f64::NAN);
        let other_nan = CellValue::Float(-f64::NAN);
        assert_eq!(nan, other_nan);
        assert_eq!(nan.cmp(&other_nan), Ordering::Equal);
        assert_eq!(hash_of(&nan), hash_of(&other_nan));

        let zero = CellValue::Float(0.0);
        let neg_zero = CellValue::Float(-0.0);
        assert_eq!(zero, neg_zero);
        assert_eq!(zero.cmp(&neg_zero), Ordering::Equal);
        assert_eq!(hash_of(&zero), hash_of(&neg_zero));
        assert_eq!(neg_zero.normalized().to_string(), "0");

        assert!(CellValue::Float(-1.0) < zero);
        assert_ne!(zero, CellValue::Integer(0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![CellValue::Null], vec![]];
        assert!(Table::new(vec!["a".into()], rows).is_err());
    }

    #[test]
    fn mask_counts_follow_cells() {
        let mask = diagonal_table().missing_mask();
        assert_eq!(mask.row_counts(), vec![1, 1, 1, 0]);
        assert_eq!(mask.col_counts(), vec![1, 1, 1]);
        assert_eq!(mask.total_missing(), 3);
    }

    #[test]
    fn selection_keeps_original_positions() {
        let table = diagonal_table();
        let sub = table.select(&[false, true, true, true], &[true, false, true]);
        assert_eq!(sub.shape(), (3, 2));
        assert_eq!(sub.original_rows(), &[1, 2, 3]);
        assert_eq!(sub.original_cols(), &[0, 2]);
        assert_eq!(sub.columns, vec!["a", "c"]);
        assert_eq!(sub.cell(1, 1), &CellValue::Null);
    }

    #[test]
    fn permuted_mask_moves_whole_rows() {
        let mask = diagonal_table().missing_mask().permute_rows(&[3, 0, 1, 2]);
        assert_eq!(mask.row_counts(), vec![0, 1, 1, 1]);
        assert!(mask.get(1, 0));
    }

    #[test]
    fn mixed_labels_sort_by_kind_then_value() {
        let mut values = vec![
            CellValue::from("b"),
            CellValue::Integer(2),
            CellValue::from("a"),
            CellValue::Null,
            CellValue::Integer(-1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Integer(-1),
                CellValue::Integer(2),
                CellValue::from("a"),
                CellValue::from("b"),
            ]
        );
    }
}
