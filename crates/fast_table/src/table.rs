//! Named columns with units

use derive_more::derive::{From, IsVariant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Values of one column
#[derive(Debug, Clone, PartialEq, From, IsVariant)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Values {
    Numeric(Vec<f64>),
    /// File names and other cells that are not numbers
    Text(Vec<String>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Numeric(v) => v.len(),
            Values::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Values::Numeric(v) => Some(v),
            Values::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    pub name: String,
    /// Unit without brackets, empty when the column has none
    pub unit: String,
    pub values: Values,
}

impl Column {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, values: impl Into<Values>) -> Self {
        Column {
            name: name.into(),
            unit: unit.into(),
            values: values.into(),
        }
    }

    /// `name_[unit]`, or the bare name without a unit
    pub fn label(&self) -> String {
        if self.unit.is_empty() {
            self.name.clone()
        } else {
            format!("{}_[{}]", self.name, self.unit)
        }
    }

    /// Numeric values, failing for text columns
    pub fn numbers(&self) -> Result<&[f64]> {
        self.values
            .as_numeric()
            .ok_or_else(|| Error::NotNumeric(self.label()))
    }
}

/// A named set of columns of equal length
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            columns,
        }
    }

    pub fn push(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Column by label or by bare name, compared without case
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(key))
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(Column::label).collect()
    }

    /// Number of values in the first column
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.columns.len())
    }

    /// Check every column holds as many values as the first.
    pub fn check_columns(&self) -> Result<()> {
        let expected = self.row_count();
        match self.columns.iter().find(|c| c.values.len() != expected) {
            Some(column) => Err(Error::RaggedColumns {
                column: column.label(),
                expected,
                found: column.values.len(),
            }),
            None => Ok(()),
        }
    }

    /// Row major numbers, failing for text columns
    pub(crate) fn numeric_rows(&self) -> Result<Vec<Vec<f64>>> {
        self.check_columns()?;
        let columns = self
            .columns
            .iter()
            .map(Column::numbers)
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.row_count())
            .map(|r| columns.iter().map(|c| c[r]).collect())
            .collect())
    }
}

/// Split `Wind1VelX_[m/s]` or `Wind1VelX_(m/s)` into name and unit.
pub fn split_label(label: &str) -> (String, String) {
    for (open, close) in [("_[", ']'), ("_(", ')')] {
        if let Some(inner) = label.strip_suffix(close) {
            if let Some((name, unit)) = inner.rsplit_once(open) {
                return (name.to_string(), unit.to_string());
            }
        }
    }
    (label.to_string(), String::new())
}
