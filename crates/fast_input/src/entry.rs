//! Entries making up a parsed input file

use derive_more::derive::{From, IsVariant};

use crate::catalog::{Dimension, TableKind};
use crate::value::Value;

/// One logical element of an input file, in file order
#[derive(Debug, Clone, PartialEq, From, IsVariant)]
pub enum Entry {
    /// A line kept byte for byte
    Comment(String),
    Scalar(Scalar),
    Table(NumericTable),
    FileTable(FileRefTable),
    OutputList(OutputChannelList),
    BeamSections(BeamSectionTable),
    Block(VerbatimBlock),
}

impl Entry {
    /// Label the entry is looked up by, comments have none
    pub fn label(&self) -> Option<&str> {
        match self {
            Entry::Comment(_) => None,
            Entry::Scalar(s) => Some(&s.label),
            Entry::Table(t) => Some(&t.label),
            Entry::FileTable(t) => Some(&t.label),
            Entry::OutputList(l) => Some(&l.label),
            Entry::BeamSections(b) => Some(&b.label),
            Entry::Block(b) => Some(&b.label),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Entry::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&NumericTable> {
        match self {
            Entry::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// `value  label  - description`
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub label: String,
    pub value: Value,
    pub description: String,
}

impl Scalar {
    pub fn new(label: impl Into<String>, value: impl Into<Value>, description: impl Into<String>) -> Self {
        Scalar {
            label: label.into(),
            value: value.into(),
            description: description.into(),
        }
    }
}

/// How a table is written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Padded header lines, integers or scientific cells
    Aligned,
    /// Padded header lines, cells as read
    Plain,
    /// Header lines behind `!`, scientific cells
    Commented,
}

/// Cells of a table
#[derive(Debug, Clone, PartialEq, IsVariant)]
pub enum Rows {
    Numeric(Vec<Vec<f64>>),
    Mixed(Vec<Vec<String>>),
}

impl Rows {
    pub fn len(&self) -> usize {
        match self {
            Rows::Numeric(rows) => rows.len(),
            Rows::Mixed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cells of the widest row
    pub fn width(&self) -> usize {
        match self {
            Rows::Numeric(rows) => rows.iter().map(Vec::len).max().unwrap_or_default(),
            Rows::Mixed(rows) => rows.iter().map(Vec::len).max().unwrap_or_default(),
        }
    }
}

/// Table whose row count is given by an earlier scalar
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    pub label: String,
    pub dimension: Dimension,
    pub columns: Vec<String>,
    /// Units as written, parenthesis included, when the table has a unit line
    pub units: Option<Vec<String>>,
    pub rows: Rows,
    pub style: TableStyle,
    /// Header lines written before the rows
    pub header_lines: usize,
    /// Line announcing the table when it is not part of the header
    pub title: Option<String>,
    /// Lines kept verbatim between the trigger line and the rows
    pub preamble: Vec<String>,
}

impl NumericTable {
    /// Numeric or mixed, mixed tables whose cells are all numbers being numeric
    pub fn kind(&self) -> TableKind {
        match self.rows {
            Rows::Numeric(_) => TableKind::Numeric,
            Rows::Mixed(_) => TableKind::Mixed,
        }
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Numeric rows, `None` for tables holding text
    pub fn values(&self) -> Option<&[Vec<f64>]> {
        match &self.rows {
            Rows::Numeric(rows) => Some(rows),
            Rows::Mixed(_) => None,
        }
    }

    /// Values of one column by name, compared without case
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))?;
        self.values()?
            .iter()
            .map(|row| row.get(index).copied())
            .collect()
    }
}

/// List of file names, the first sharing the line of the label
#[derive(Debug, Clone, PartialEq)]
pub struct FileRefTable {
    pub label: String,
    pub dimension: String,
    pub filenames: Vec<String>,
    pub description: String,
}

/// Channel selectors up to an `END` line
#[derive(Debug, Clone, PartialEq)]
pub struct OutputChannelList {
    pub label: String,
    pub description: String,
    /// Lines as written, quotes and comments included
    pub channels: Vec<String>,
    /// Whether the list writes its own header line
    pub titled: bool,
}

impl OutputChannelList {
    /// Channel names without quotes and comments, split on commas
    pub fn names(&self) -> Vec<String> {
        self.channels
            .iter()
            .flat_map(|line| {
                let line = line.split('-').next().unwrap_or_default();
                line.split([',', ' ', '\t'])
                    .map(|n| n.trim_matches(['"', '\'']).trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// A 6x6 matrix, row major
pub type Matrix6 = [[f64; 6]; 6];

/// Stiffness and mass matrices along a beam
#[derive(Debug, Clone, PartialEq)]
pub struct BeamSectionTable {
    pub label: String,
    pub span: Vec<f64>,
    pub stiffness: Vec<Matrix6>,
    pub mass: Vec<Matrix6>,
}

/// Fixed block of lines stored as written
#[derive(Debug, Clone, PartialEq)]
pub struct VerbatimBlock {
    pub label: String,
    pub lines: Vec<String>,
}
