//! # FAST tables
//!
//! Named columns with units, built from the two file kinds the tools produce:
//!
//! - binary output files through [`Table::from_output`], and back through [`Table::into_channels`]
//! - tables of text input files through [`Table::from_input`], and back through [`Table::to_numeric_table`]
//!
//! Column labels read `name_[unit]`, bare names when a column has no unit.
//!
//! ## Features
//!
//! | Feature  | Default | Adds                                            |
//! |----------|---------|-------------------------------------------------|
//! | `serde`  | yes     | `Serialize` and `Deserialize` on [`Table`]      |
//! | `polars` | no      | `Table::to_dataframe`                           |
//!
//! ```
//! use fast_table::{Column, Table};
//!
//! let table = Table::with_columns(
//!     "run",
//!     vec![
//!         Column::new("Time", "s", vec![0.0, 0.05]),
//!         Column::new("RotSpeed", "rpm", vec![12.1, 12.2]),
//!     ],
//! );
//! assert_eq!(table.labels(), ["Time_[s]", "RotSpeed_[rpm]"]);
//!
//! let channels = table.into_channels().unwrap();
//! assert_eq!(channels.names, ["Time", "RotSpeed"]);
//! ```

pub mod error;
#[cfg(feature = "polars")]
mod frame;
mod input;
mod output;
pub mod table;

pub use output::Channels;
pub use table::{split_label, Column, Table, Values};
