//! Text rendering of entries
//!
//! Every entry renders to one or more lines without a trailing newline, so a file is its
//! entries joined by newlines. Tables only repeat the header lines they were read with, which
//! keeps the output readable by [`crate::InputFile::parse`].

use std::fmt::{self, Display};

use itertools::Itertools;

use crate::entry::{
    BeamSectionTable, Entry, FileRefTable, Matrix6, NumericTable, OutputChannelList, Rows, Scalar,
    TableStyle, VerbatimBlock,
};
use crate::value::Value;

const FIELD_WIDTH: usize = 13;
const CELL_WIDTH: usize = 15;

/// Scientific notation with a signed exponent of at least two digits, `1.50000000e-05`
pub fn sci(x: f64, precision: usize, upper: bool) -> String {
    if !x.is_finite() {
        let s = if x.is_nan() {
            "nan"
        } else if x > 0.0 {
            "inf"
        } else {
            "-inf"
        };
        return if upper { s.to_uppercase() } else { s.to_string() };
    }

    let formatted = format!("{x:.precision$e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{mantissa}{e}{sign}{:02}", exponent.abs())
}

/// Integral numbers without decimals, others in scientific notation
fn number_cell(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{x:>CELL_WIDTH$.0}")
    } else {
        format!("{:>CELL_WIDTH$}", sci(x, 8, false))
    }
}

fn header_line<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("{:<CELL_WIDTH$}", n.as_ref()))
        .join(" ")
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Value::List(_) = self.value {
            return write!(f, "{} {} {}", self.value, self.label, self.description);
        }
        let description = self.description.trim().trim_matches('-').trim();
        let line = format!(
            "{:<FIELD_WIDTH$} {:<FIELD_WIDTH$} - {description}",
            self.value.to_string(),
            self.label
        );
        f.write_str(line.trim())
    }
}

impl Display for NumericTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        lines.extend(self.title.iter().cloned());
        lines.extend(self.preamble.iter().cloned());

        let marker = match self.style {
            TableStyle::Commented => "! ",
            TableStyle::Aligned | TableStyle::Plain => "",
        };
        if self.header_lines >= 1 {
            lines.push(format!("{marker}{}", header_line(&self.columns)));
        }
        if self.header_lines >= 2 {
            if let Some(units) = &self.units {
                lines.push(format!("{marker}{}", header_line(units)));
            }
        }

        match &self.rows {
            Rows::Numeric(rows) => {
                for row in rows {
                    let mut cells = row.iter().map(|&x| match self.style {
                        TableStyle::Commented => format!("{:>CELL_WIDTH$}", sci(x, 8, false)),
                        TableStyle::Aligned | TableStyle::Plain => number_cell(x),
                    });
                    lines.push(cells.join("\t"));
                }
            }
            Rows::Mixed(rows) => lines.extend(rows.iter().map(|row| row.join("\t"))),
        }

        f.write_str(&lines.join("\n"))
    }
}

impl Display for FileRefTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.filenames.iter();
        if let Some(first) = names.next() {
            write!(f, "{first} {} {}", self.label, self.description)?;
        }
        for name in names {
            write!(f, "\n{name}")?;
        }
        Ok(())
    }
}

impl Display for OutputChannelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::with_capacity(self.channels.len() + 1);
        if self.titled {
            // the nodal suffix is added back when the file is read
            let label = self.label.strip_suffix("_Nodal").unwrap_or(&self.label);
            lines.push(format!(
                "{:<FIELD_WIDTH$} {label:<FIELD_WIDTH$} - {}",
                "", self.description
            ));
        }
        lines.extend(self.channels.iter().cloned());
        f.write_str(&lines.join("\n"))
    }
}

fn matrix_lines(matrix: &Matrix6) -> impl Iterator<Item = String> + '_ {
    matrix.iter().map(|row| {
        let mut cells = row.iter().map(|&m| format!("{:>24}", sci(m, 16, true)));
        format!("   {}", cells.join(" "))
    })
}

impl Display for BeamSectionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for ((span, stiffness), mass) in self.span.iter().zip(&self.stiffness).zip(&self.mass) {
            lines.push(format!("{span:.6}"));
            lines.extend(matrix_lines(stiffness));
            lines.push(String::new());
            lines.extend(matrix_lines(mass));
            lines.push(String::new());
        }
        f.write_str(&lines.join("\n"))
    }
}

impl Display for VerbatimBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Comment(line) => f.write_str(line),
            Entry::Scalar(scalar) => Display::fmt(scalar, f),
            Entry::Table(table) => Display::fmt(table, f),
            Entry::FileTable(table) => Display::fmt(table, f),
            Entry::OutputList(list) => Display::fmt(list, f),
            Entry::BeamSections(sections) => Display::fmt(sections, f),
            Entry::Block(block) => Display::fmt(block, f),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::catalog::Dimension;
    use crate::entry::{NumericTable, OutputChannelList, Rows, Scalar, TableStyle};
    use crate::value::Value;
    use crate::write::{number_cell, sci};

    #[test]
    fn scientific_notation() {
        assert_eq!(sci(1.5e-5, 8, false), "1.50000000e-05");
        assert_eq!(sci(-2.0, 8, false), "-2.00000000e+00");
        assert_eq!(sci(1.25e120, 2, true), "1.25E+120");
        assert_eq!(sci(f64::NAN, 8, false), "nan");
        assert_eq!(number_cell(3.0), "              3");
        assert_eq!(number_cell(0.25), " 2.50000000e-01");
    }

    #[test]
    fn scalar_lines() {
        let blades = Scalar::new("NumBl", 3, "- Number of blades (-)");
        assert_eq!(
            blades.to_string(),
            "3             NumBl         - Number of blades (-)"
        );

        let file = Scalar::new("TwrFile", "\"NRELOffshrBsline5MW_Tower.dat\"", "");
        assert_eq!(
            file.to_string(),
            "\"NRELOffshrBsline5MW_Tower.dat\" TwrFile       -"
        );

        let point = Scalar::new(
            "AirfoilRefPoint",
            vec![Value::Float(0.25), Value::Float(0.0)],
            "",
        );
        assert_eq!(point.to_string(), "0.25, 0.0 AirfoilRefPoint ");
    }

    #[test]
    fn aligned_table() {
        let table = NumericTable {
            label: "BldAeroNodes".into(),
            dimension: Dimension::Variable("NumBlNds"),
            columns: vec!["r".into(), "chord".into()],
            units: Some(vec!["(m)".into(), "(m)".into()]),
            rows: Rows::Numeric(vec![vec![1.0, 0.5]]),
            style: TableStyle::Aligned,
            header_lines: 2,
            title: Some("BldAeroNodes".into()),
            preamble: Vec::new(),
        };
        let expected = [
            "BldAeroNodes",
            "r               chord          ",
            "(m)             (m)            ",
            "              1\t 5.00000000e-01",
        ];
        assert_eq!(table.to_string(), expected.join("\n"));
    }

    #[test]
    fn nodal_lists_keep_their_header_word() {
        let list = OutputChannelList {
            label: "OutList_Nodal".into(),
            description: "The next line(s) contains a list of output parameters".into(),
            channels: vec!["\"RtAeroFxh\"".into()],
            titled: true,
        };
        assert_eq!(
            list.to_string(),
            "              OutList       - The next line(s) contains a list of output parameters\n\"RtAeroFxh\""
        );
    }
}
