//! Tables found in text input files

use fast_input::{
    BeamSectionTable, Dimension, Entry, FileRefTable, InputFile, NumericTable, Rows, TableStyle,
};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::table::{split_label, Column, Table};

fn bare_unit(unit: &str) -> String {
    unit.trim_matches(|c| matches!(c, '(' | ')' | '[' | ']'))
        .trim()
        .to_string()
}

fn numeric_table(table: &NumericTable) -> Option<Table> {
    let values = table.values()?;
    let units = table.units.as_deref().unwrap_or_default();
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| {
            Column::new(
                name.as_str(),
                units.get(c).map(|u| bare_unit(u)).unwrap_or_default(),
                values
                    .iter()
                    .map(|row| row.get(c).copied().unwrap_or(f64::NAN))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    Some(Table::with_columns(table.label.as_str(), columns))
}

fn file_table(table: &FileRefTable) -> Table {
    Table::with_columns(
        table.label.as_str(),
        vec![Column::new(
            table.label.as_str(),
            "",
            table.filenames.clone(),
        )],
    )
}

/// Span, then the diagonal terms, then the rest of both matrices
fn beam_table(sections: &BeamSectionTable) -> Table {
    let mut columns = vec![Column::new("Span", "", sections.span.clone())];
    let term = |prefix: &str, matrices: &[fast_input::Matrix6], i: usize, j: usize| {
        Column::new(
            format!("{prefix}{}{}", i + 1, j + 1),
            "",
            matrices.iter().map(|m| m[i][j]).collect::<Vec<_>>(),
        )
    };

    for (prefix, matrices) in [("K", sections.stiffness.as_slice()), ("M", sections.mass.as_slice())] {
        columns.extend((0..6).map(|i| term(prefix, matrices, i, i)));
    }
    for (prefix, matrices) in [("K", sections.stiffness.as_slice()), ("M", sections.mass.as_slice())] {
        for i in 0..6 {
            columns.extend((0..6).filter(|&j| j != i).map(|j| term(prefix, matrices, i, j)));
        }
    }
    Table::with_columns(sections.label.as_str(), columns)
}

impl Table {
    /// One table per table entry of an input file.
    ///
    /// Tables holding text cells are left out, file name lists become a single text column.
    #[instrument(skip_all)]
    pub fn from_input(file: &InputFile) -> Vec<Table> {
        let tables: Vec<Table> = file
            .entries()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Table(table) => numeric_table(table),
                Entry::FileTable(table) => Some(file_table(table)),
                Entry::BeamSections(sections) => Some(beam_table(sections)),
                _ => None,
            })
            .collect();
        debug!(tables = tables.len(), "tables found in input file");
        tables
    }

    /// A numeric table entry holding this table, labels split back into name and unit
    pub fn to_numeric_table(&self, label: &str, dimension: Dimension) -> Result<NumericTable> {
        let rows = self.numeric_rows()?;
        let (columns, units): (Vec<String>, Vec<String>) = self
            .columns
            .iter()
            .map(|c| {
                let (name, unit) = if c.unit.is_empty() {
                    split_label(&c.name)
                } else {
                    (c.name.clone(), c.unit.clone())
                };
                (name, format!("({unit})"))
            })
            .unzip();
        let has_units = units.iter().any(|u| u != "()");

        Ok(NumericTable {
            label: label.to_string(),
            dimension,
            columns,
            units: has_units.then_some(units),
            rows: Rows::Numeric(rows),
            style: TableStyle::Aligned,
            header_lines: if has_units { 2 } else { 1 },
            title: None,
            preamble: Vec::new(),
        })
    }
}
