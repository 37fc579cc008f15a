//! An input file as an ordered list of entries with a label index

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::catalog::Dimension;
use crate::entry::{Entry, NumericTable, Scalar};
use crate::error::{Error, Result};
use crate::parse::{parse, resolve_variable, ParseOptions, AIRFOIL_COORDINATES};
use crate::value::Value;

/// Bytes looked at when telling text from binary content
const SNIFF_LENGTH: usize = 8192;
/// Share of control characters above which content is taken as binary
const BINARY_CONTROL_RATIO: f64 = 0.1;

/// Decode the raw content of an input file.
///
/// Content holding NUL bytes or many control characters is [`Error::NotThisFormat`], so
/// callers can hand it to another reader. Text that is not UTF-8 is read as Latin-1, the
/// encoding older decks use for symbols such as `°` in comments.
pub fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if bytes.is_empty() {
        return Err(Error::NotThisFormat("file is empty".into()));
    }

    let head = &bytes[..bytes.len().min(SNIFF_LENGTH)];
    if head.contains(&0) {
        return Err(Error::NotThisFormat("binary content, NUL bytes found".into()));
    }
    let control = head
        .iter()
        .filter(|&&b| b.is_ascii_control() && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c))
        .count();
    if control as f64 > head.len() as f64 * BINARY_CONTROL_RATIO {
        return Err(Error::NotThisFormat(format!(
            "binary content, {control} control characters in the first {} bytes",
            head.len()
        )));
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(e) => {
            debug!(valid_up_to = e.valid_up_to(), "not UTF-8, reading as Latin-1");
            Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect()))
        }
    }
}

/// A parsed input file
///
/// Entries keep the order of the text, so writing a file back reproduces its layout. Lookups
/// by label ignore case and return the first matching entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFile {
    entries: Vec<Entry>,
    warnings: Vec<String>,
    index: IndexMap<String, Vec<usize>>,
}

impl InputFile {
    /// Parse text with the default thresholds
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, ParseOptions::default())
    }

    pub fn parse_with(text: &str, options: ParseOptions) -> Result<Self> {
        let (entries, warnings) = parse(text, options)?;
        let mut file = InputFile {
            entries,
            warnings,
            index: IndexMap::new(),
        };
        file.reindex();
        Ok(file)
    }

    /// Build a file from entries, e.g. to write a new input file
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut file = InputFile {
            entries: entries.into_iter().collect(),
            ..Default::default()
        };
        file.reindex();
        file
    }

    #[instrument(skip_all, err, fields(path = %path.as_ref().display()))]
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let file = Self::from_bytes(&bytes)?;
        debug!(entries = file.entries.len(), "read input file");
        Ok(file)
    }

    /// Parse the raw content of a file, see [`decode_text`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&decode_text(bytes)?)
    }

    /// Write the file after checking every table still matches the scalar sizing it.
    #[instrument(skip_all, err, fields(path = %path.as_ref().display()))]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.check_dimensions()?;
        fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Compare the rows of every sized table with the scalar giving its size.
    ///
    /// The scalar is looked up before the table, as when parsing, so a file passing this
    /// check reads back with the same tables.
    pub fn check_dimensions(&self) -> Result<()> {
        for (i, entry) in self.entries.iter().enumerate() {
            let (label, variable, found) = match entry {
                Entry::Table(NumericTable {
                    label,
                    dimension: Dimension::Variable(name),
                    rows,
                    ..
                }) => (label, *name, rows.len()),
                Entry::FileTable(table) => (&table.label, table.dimension.as_str(), table.filenames.len()),
                Entry::BeamSections(table) => (&table.label, "station_total", table.span.len()),
                _ => continue,
            };

            let declared = resolve_variable(&self.entries[..i], variable, 0)?;
            // the first airfoil coordinate is the reference point, stored apart
            let expected = if label == AIRFOIL_COORDINATES {
                declared.saturating_sub(1)
            } else {
                declared
            };
            if expected != found {
                return Err(Error::DimensionMismatch {
                    label: label.clone(),
                    variable: variable.to_string(),
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            if let Some(label) = entry.label() {
                self.index
                    .entry(label.to_lowercase())
                    .or_default()
                    .push(i);
            }
        }
    }

    fn positions(&self, label: &str) -> &[usize] {
        self.index
            .get(&label.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First entry with this label
    pub fn get(&self, label: &str) -> Option<&Entry> {
        self.positions(label).first().map(|&i| &self.entries[i])
    }

    /// Every entry with this label, in file order
    pub fn get_all<'s>(&'s self, label: &str) -> impl Iterator<Item = &'s Entry> + 's {
        self.positions(label).iter().map(|&i| &self.entries[i])
    }

    pub fn get_scalar(&self, label: &str) -> Result<&Scalar> {
        let entry = self
            .get(label)
            .ok_or_else(|| Error::LabelNotFound(label.to_string()))?;
        entry.as_scalar().ok_or_else(|| Error::TypeMismatch {
            label: label.to_string(),
            expected: "a scalar",
        })
    }

    fn typed<T>(
        &self,
        label: &str,
        expected: &'static str,
        get: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<T> {
        get(&self.get_scalar(label)?.value).ok_or_else(|| Error::TypeMismatch {
            label: label.to_string(),
            expected,
        })
    }

    pub fn get_int(&self, label: &str) -> Result<i64> {
        self.typed(label, "an integer", Value::as_int)
    }

    /// Float value, integers are promoted
    pub fn get_float(&self, label: &str) -> Result<f64> {
        self.typed(label, "a number", Value::as_float)
    }

    pub fn get_bool(&self, label: &str) -> Result<bool> {
        self.typed(label, "a boolean", Value::as_bool)
    }

    pub fn get_str(&self, label: &str) -> Result<&str> {
        match &self.get_scalar(label)?.value {
            Value::Str(s) => Ok(s),
            _ => Err(Error::TypeMismatch {
                label: label.to_string(),
                expected: "a string",
            }),
        }
    }

    pub fn get_table(&self, label: &str) -> Result<&NumericTable> {
        let mut found = false;
        for entry in self.get_all(label) {
            found = true;
            if let Some(table) = entry.as_table() {
                return Ok(table);
            }
        }
        if found {
            Err(Error::TypeMismatch {
                label: label.to_string(),
                expected: "a table",
            })
        } else {
            Err(Error::LabelNotFound(label.to_string()))
        }
    }

    /// Set the value of every scalar sharing the label.
    pub fn set_value(&mut self, label: &str, value: impl Into<Value>) -> Result<()> {
        let positions = self.positions(label).to_vec();
        if positions.is_empty() {
            return Err(Error::LabelNotFound(label.to_string()));
        }

        let value = value.into();
        let mut updated = 0;
        for i in positions {
            if let Entry::Scalar(scalar) = &mut self.entries[i] {
                scalar.value = value.clone();
                updated += 1;
            }
        }
        if updated == 0 {
            return Err(Error::TypeMismatch {
                label: label.to_string(),
                expected: "a scalar",
            });
        }
        Ok(())
    }

    /// Append a scalar at the end of the file
    pub fn push_scalar(
        &mut self,
        label: impl Into<String>,
        value: impl Into<Value>,
        description: impl Into<String>,
    ) {
        self.entries
            .push(Scalar::new(label, value, description).into());
        self.reindex();
    }

    /// Insert an entry before `index`, past the end appends.
    pub fn insert(&mut self, index: usize, entry: impl Into<Entry>) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry.into());
        self.reindex();
    }

    /// Labels in file order, repeated labels included
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(Entry::label)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Non fatal problems found while parsing
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl FromStr for InputFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
