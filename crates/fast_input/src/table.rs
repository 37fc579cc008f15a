//! Readers for the blocks of lines making up a table

use tracing::{trace, warn};

use crate::catalog::TableKind;
use crate::entry::{BeamSectionTable, Matrix6, Rows};
use crate::error::{Error, Result};
use crate::lexer::{clean_after, clean_line, detect_units, numeric_tokens};
use crate::value::is_float;

/// Name given to columns found in the data but missing from the header
pub const PLACEHOLDER_COLUMN: &str = "Col";

/// Columns whose tables legitimately carry a varying number of cells
const RAGGED_NUMERIC: [&str; 1] = ["nodecnt"];
const RAGGED_MIXED: [&str; 2] = ["cosmid", "ssifile"];

/// Log a non fatal problem and keep it for the caller
pub(crate) fn report(warnings: &mut Vec<String>, message: String) {
    warn!("{message}");
    warnings.push(message);
}

/// Layout of the lines handed to [`read_table`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout<'a> {
    /// Line number of the first line, starting at 1
    pub first_line: usize,
    pub kind: TableKind,
    pub header_lines: usize,
    pub row_offset: usize,
    pub rows: usize,
    /// Name of the scalar sizing the table, for messages
    pub dimension: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedTable {
    pub columns: Vec<String>,
    pub units: Option<Vec<String>>,
    pub rows: Rows,
}

/// Column names out of the first header line
fn column_names(line: &str) -> Vec<String> {
    let cleaned = clean_line(line);
    let mut header = cleaned.as_str();
    for c in ['[', '(', '!', '#'] {
        header = clean_after(header, c);
    }
    let header = header.strip_prefix('!').unwrap_or(header);
    header.split_whitespace().map(str::to_string).collect()
}

/// Units out of the second header line, each wrapped in parenthesis
fn unit_names(line: &str, columns: usize) -> Vec<String> {
    let cleaned = clean_line(line);
    let header = clean_after(clean_after(&cleaned, '!'), '#');
    let header = header.strip_prefix('!').unwrap_or(header).trim();
    detect_units(header, columns)
        .into_iter()
        .map(|u| wrap_unit(&u))
        .collect()
}

pub(crate) fn wrap_unit(unit: &str) -> String {
    let bare: String = unit.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    format!("({})", bare.trim())
}

fn numeric_cell(token: &str) -> Option<f64> {
    match token {
        "true" | "print" => Some(1.0),
        "false" | "noprint" => Some(0.0),
        _ => token.parse().ok(),
    }
}

/// Read a numeric or mixed table from exactly the lines it spans.
pub(crate) fn read_table(
    lines: &[&str],
    layout: Layout<'_>,
    warnings: &mut Vec<String>,
) -> Result<ParsedTable> {
    let start = layout.header_lines + layout.row_offset;
    if lines.len() < start + layout.rows {
        return Err(Error::BrokenTable {
            line: layout.first_line,
            message: format!(
                "not enough lines in table: {} instead of {}",
                lines.len().saturating_sub(start),
                layout.rows
            ),
        });
    }

    let (mut columns, mut units) = match layout.header_lines {
        0 => {
            let first = clean_after(lines[layout.row_offset], '!');
            let count = match layout.kind {
                TableKind::Numeric => numeric_tokens(first).len(),
                TableKind::Mixed => first.split_whitespace().count(),
            };
            ((0..count).map(|c| format!("C{c}")).collect(), None)
        }
        1 => (column_names(lines[0]), None),
        _ => {
            let columns = column_names(lines[0]);
            let units = unit_names(lines[1], columns.len());
            if units.len() != columns.len() {
                report(
                    warnings,
                    format!(
                        "line {}: {} column names but {} units",
                        layout.first_line + 1,
                        columns.len(),
                        units.len()
                    ),
                );
            }
            (columns, Some(units))
        }
    };
    trace!(?columns, ?units, "table header");

    let ragged: &[&str] = match layout.kind {
        TableKind::Numeric => &RAGGED_NUMERIC,
        TableKind::Mixed => &RAGGED_MIXED,
    };
    let tolerates_ragged = columns
        .last()
        .is_some_and(|c| ragged.iter().any(|r| c.eq_ignore_ascii_case(r)));

    let mut width = columns.len();
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(layout.rows);
    for (r, raw) in lines[start..start + layout.rows].iter().enumerate() {
        let line = layout.first_line + start + r;
        let cleaned = clean_after(clean_after(raw, '!'), '#');
        if layout.kind == TableKind::Mixed && cleaned.trim_start().starts_with("---") {
            return Err(Error::BrokenTable {
                line,
                message: format!(
                    "section separator found while reading table, is `{}` set correctly?",
                    layout.dimension
                ),
            });
        }

        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        if tokens.len() != width && !tolerates_ragged {
            report(
                warnings,
                format!(
                    "line {line}: {} values for {} columns ({})",
                    tokens.len(),
                    width,
                    columns.join(" ")
                ),
            );
        }
        if r == 0 {
            if tokens.len() > columns.len() {
                let extra = tokens.len() - columns.len();
                columns.extend(std::iter::repeat(PLACEHOLDER_COLUMN.to_string()).take(extra));
                if let Some(units) = units.as_mut() {
                    units.extend(std::iter::repeat(wrap_unit(PLACEHOLDER_COLUMN)).take(extra));
                }
            }
            width = tokens.len();
        }

        let mut row: Vec<String> = tokens.iter().take(width).map(|t| t.to_string()).collect();
        if row.len() < width {
            if layout.kind == TableKind::Numeric {
                return Err(Error::BrokenTable {
                    line,
                    message: format!("{} values for {} columns", row.len(), width),
                });
            }
            row.resize(width, "0".to_string());
        }
        cells.push(row);
    }

    columns.truncate(width);
    if let Some(units) = units.as_mut() {
        units.truncate(width);
    }

    let rows = match layout.kind {
        TableKind::Numeric => {
            let mut rows = Vec::with_capacity(cells.len());
            for (r, row) in cells.iter().enumerate() {
                let values = row
                    .iter()
                    .map(|cell| {
                        numeric_cell(&cell.to_ascii_lowercase()).ok_or_else(|| Error::BrokenTable {
                            line: layout.first_line + start + r,
                            message: format!("cannot read `{cell}` as a number"),
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                rows.push(values);
            }
            Rows::Numeric(rows)
        }
        TableKind::Mixed if cells.iter().flatten().all(|c| is_float(c)) => Rows::Numeric(
            cells
                .iter()
                .map(|row| row.iter().filter_map(|c| c.parse().ok()).collect())
                .collect(),
        ),
        TableKind::Mixed => Rows::Mixed(cells),
    };

    Ok(ParsedTable {
        columns,
        units,
        rows,
    })
}

/// First word of each line
pub(crate) fn read_file_table(lines: &[&str], first_line: usize) -> Result<Vec<String>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            line.split_whitespace()
                .next()
                .map(str::to_string)
                .ok_or_else(|| Error::BrokenTable {
                    line: first_line + i,
                    message: "missing file name".into(),
                })
        })
        .collect()
}

fn read_matrix(lines: &[&str]) -> Option<Matrix6> {
    let values = lines
        .iter()
        .flat_map(|l| l.split_whitespace())
        .map(|t| t.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    if values.len() != 36 {
        return None;
    }
    let mut matrix = [[0.0; 6]; 6];
    for (i, value) in values.into_iter().enumerate() {
        matrix[i / 6][i % 6] = value;
    }
    Some(matrix)
}

/// Lines of one station: span, stiffness, blank, mass, blank
pub(crate) const BEAM_STATION_LINES: usize = 15;

/// Read `stations` blocks of a span position and its stiffness and mass matrices.
pub(crate) fn read_beam_sections(
    lines: &[&str],
    first_line: usize,
    stations: usize,
) -> Result<BeamSectionTable> {
    // the station count comes from the file, only the lines present bound the allocation
    let capacity = stations.min(lines.len() / BEAM_STATION_LINES + 1);
    let mut table = BeamSectionTable {
        label: "BeamProperties".into(),
        span: Vec::with_capacity(capacity),
        stiffness: Vec::with_capacity(capacity),
        mass: Vec::with_capacity(capacity),
    };

    for j in 0..stations {
        let at = j * BEAM_STATION_LINES;
        let broken = || Error::BrokenTable {
            line: first_line + at,
            message: format!("cannot read section {}/{}", j + 1, stations),
        };

        let span = lines
            .get(at)
            .and_then(|l| l.trim().parse::<f64>().ok())
            .ok_or_else(broken)?;
        let stiffness = lines
            .get(at + 1..at + 7)
            .and_then(read_matrix)
            .ok_or_else(broken)?;
        let mass = lines
            .get(at + 8..at + 14)
            .and_then(read_matrix)
            .ok_or_else(broken)?;

        table.span.push(span);
        table.stiffness.push(stiffness);
        table.mass.push(mass);
    }
    Ok(table)
}
