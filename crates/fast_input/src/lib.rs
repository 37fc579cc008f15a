//! # FAST Input Files
//!
//! Reader and writer for the text input files of the FAST/OpenFAST aeroelastic tool
//! (ElastoDyn, AeroDyn, ServoDyn, HydroDyn, SubDyn, BeamDyn, MoorDyn, airfoil polars...).
//!
//! ## File Structure
//!
//! Input files are line oriented and carry no schema. Each line is one of:
//!
//! | Line                                   | Parsed as                                     |
//! |----------------------------------------|-----------------------------------------------|
//! | `---- SECTION ----`, `! note`, blank   | [`Entry::Comment`], kept verbatim             |
//! | `3   NumBl  - Number of blades (-)`    | [`Entry::Scalar`]: value, label, description  |
//! | `0.25, 0.0  RefPoint`                  | [`Entry::Scalar`] holding a [`Value::List`]   |
//! | header lines followed by rows          | [`Entry::Table`], sized by an earlier scalar  |
//!
//! Tables are recognised from a catalog of known families: by the first token of their header
//! (`BlSpn`), by the label of the line introducing them (`NumAlf`, `MJointID1`) or by a line
//! holding only the table name (`BldAeroNodes`). Their row count is the integer value of a
//! scalar read earlier, e.g. `NumBlNds`.
//!
//! Output channel lists, BeamDyn 6x6 section matrices, SubDyn stiffness blocks and file name
//! lists have dedicated entries. Text rejected by the heuristics fails with
//! [`Error::NotThisFormat`](error::Error::NotThisFormat) so callers can try another reader.
//!
//! ```
//! use fast_input::InputFile;
//!
//! let text = "\
//! ---- BLADE ----
//! 3   NumBlNds  - Number of blade nodes (-)
//! BldAeroNodes
//! r     chord
//! (m)   (m)
//! 1.0   0.5
//! 2.0   0.4
//! 3.0   0.3
//! ";
//! let file = InputFile::parse(text)?;
//! assert_eq!(file.get_int("NumBlNds")?, 3);
//! assert_eq!(file.get_table("BldAeroNodes")?.shape(), (3, 2));
//! # Ok::<(), fast_input::error::Error>(())
//! ```

pub mod catalog;
pub mod entry;
pub mod error;
pub mod file;
mod lexer;
mod line;
pub mod parse;
mod table;
pub mod value;
pub mod write;

pub use catalog::{Dimension, TableKind};
pub use entry::{
    BeamSectionTable, Entry, FileRefTable, Matrix6, NumericTable, OutputChannelList, Rows, Scalar,
    TableStyle, VerbatimBlock,
};
pub use file::InputFile;
pub use parse::ParseOptions;
pub use table::PLACEHOLDER_COLUMN;
pub use value::Value;
