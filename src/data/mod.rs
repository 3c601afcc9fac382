//! Data layer: core types and loading.
//!
//! Architecture:
//! ```text
//!  .parquet / .json / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │    Table      │  rows × columns of CellValue, original positions
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ MissingMask   │  derived boolean matrix, sliced alongside Table
//!   └──────────────┘
//! ```

pub mod loader;
pub mod model;
