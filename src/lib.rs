//! Missing-data visualization: the "blackholes" figure.
//!
//! A table goes in, a [`Figure`] comes out: a frame of missing cells flanked
//! by row and column missingness strips, optionally grouped and annotated.
//!
//! ```no_run
//! use missingdata::{blackholes, BlackholesOptions};
//! use missingdata::data::loader::load_file;
//!
//! let table = load_file("survey.csv".as_ref())?;
//! let opts = BlackholesOptions {
//!     out_path: Some("survey_missing.png".into()),
//!     ..Default::default()
//! };
//! let figure = blackholes(&table, &opts)?;
//! println!("{} rows shown", figure.rows.labels.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod missing;
pub mod render;

pub use config::{BlackholesOptions, DisplayConfig, LayoutConfig};
pub use data::model::{CellValue, Table};
pub use error::{Error, Result};
pub use figure::{blackholes, Figure};
