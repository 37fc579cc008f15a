//! Line driven reader turning text into entries

use bon::Builder;
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::catalog::{Catalog, Dimension, FileTableSpec, TableKind, TableSpec};
use crate::entry::{
    Entry, FileRefTable, NumericTable, OutputChannelList, Scalar, TableStyle, VerbatimBlock,
};
use crate::error::{Error, Result};
use crate::lexer::{clean_after, clean_line, first_word};
use crate::line::{classify, Line};
use crate::table::{read_beam_sections, read_file_table, read_table, report, wrap_unit, Layout};
use crate::value::Value;

/// Line closing an input file once its output list is read
pub const END_LINE: &str =
    "END of input file (the word \"END\" must appear in the first 3 columns of this last OutList line)";

/// Separator following [`END_LINE`]
pub const SEPARATOR_LINE: &str =
    "---------------------------------------------------------------------------------------";

const OUTPUT_LIST_MARKERS: [&str; 3] = ["ADDITIONAL OUTPUTS", "MESH-BASED OUTPUTS", "OUTPUT CHANNELS"];
const NODAL_MARKERS: [&str; 2] = ["bldnd_bladesout", "bldnd_bloutnd"];
const STIFFNESS_BLOCK_LINES: usize = 19;
/// Label of the coordinates following `NumCoords` in airfoil files
pub const AIRFOIL_COORDINATES: &str = "AirfoilCoord";

/// Thresholds used to tell FAST input files from other text
#[derive(Debug, Clone, Copy, Builder)]
pub struct ParseOptions {
    /// Share of lines read as comments above which the text is rejected
    #[builder(default = 0.35)]
    pub comment_ratio: f64,

    /// Share of lines with malformed labels above which the text is rejected
    #[builder(default = 0.10)]
    pub wrong_label_ratio: f64,

    /// Longest output list accepted
    #[builder(default = 200)]
    pub max_outlist_lines: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::builder().build()
    }
}

enum Step {
    Next(usize),
    Stop,
}

/// Parse a whole file, returning its entries and the warnings raised on the way.
#[instrument(skip_all, err)]
pub(crate) fn parse(text: &str, options: ParseOptions) -> Result<(Vec<Entry>, Vec<String>)> {
    if text.trim().is_empty() {
        return Err(Error::NotThisFormat("no content".into()));
    }

    let mut parser = Parser {
        lines: text.lines().collect(),
        options,
        catalog: Catalog::default(),
        entries: Vec::new(),
        warnings: Vec::new(),
        comments: 0,
        wrong_labels: 0,
        nodal: false,
        space_lists: false,
    };

    let mut i = 0;
    while i < parser.lines.len() {
        match parser.step(i)? {
            Step::Next(next) => i = next,
            Step::Stop => break,
        }
    }
    parser.check_duplicates();

    debug!(
        entries = parser.entries.len(),
        warnings = parser.warnings.len(),
        "parsed input file"
    );
    Ok((parser.entries, parser.warnings))
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    options: ParseOptions,
    catalog: Catalog,
    entries: Vec<Entry>,
    warnings: Vec<String>,
    comments: usize,
    wrong_labels: usize,
    /// A nodal output list follows the first one
    nodal: bool,
    /// `1 2` pairs are values, as in BeamDyn key point lines
    space_lists: bool,
}

/// Labels may only hold these characters
fn is_well_formed(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '"' | '\'' | '_' | '(' | ')' | '-'))
}

/// Integer value of the first scalar named by `dimension`
pub(crate) fn resolve(entries: &[Entry], dimension: Dimension, line: usize) -> Result<usize> {
    match dimension {
        Dimension::Fixed(n) => Ok(n),
        Dimension::Variable(name) => resolve_variable(entries, name, line),
    }
}

pub(crate) fn resolve_variable(entries: &[Entry], name: &str, line: usize) -> Result<usize> {
    let unresolved = |reason: String| Error::DimensionUnresolved {
        line,
        variable: name.to_string(),
        reason,
    };

    let scalar = entries
        .iter()
        .filter_map(Entry::as_scalar)
        .find(|s| s.label.eq_ignore_ascii_case(name))
        .ok_or_else(|| unresolved("it is not defined before the table".into()))?;

    match scalar.value {
        Value::Int(n) => usize::try_from(n)
            .map_err(|_| unresolved(format!("its value {n} is negative"))),
        ref other => Err(unresolved(format!("its value `{other}` is not an integer"))),
    }
}

impl<'a> Parser<'a> {
    fn step(&mut self, i: usize) -> Result<Step> {
        let raw = self.lines[i];
        let upper = raw.to_ascii_uppercase();
        // markers sit inside a line, never at its start
        let has = |marker: &str| upper.find(marker).is_some_and(|p| p > 0);

        if OUTPUT_LIST_MARKERS.iter().any(|m| has(m)) {
            return self.output_list(i);
        }
        // SubDyn lists start their header line with the keyword
        if upper.contains("SSOUTLIST") || upper.contains("SDOUTLIST") {
            let label = if upper.contains("SSOUTLIST") {
                "SSOutList"
            } else {
                "SDOutList"
            };
            return self.sub_output_list(i, label);
        }
        if has("ADDITIONAL STIFFNESS") {
            return self.stiffness_block(i);
        }
        if has("DISTRIBUTED PROPERTIES") {
            return self.beam_properties(i);
        }

        let cleaned = clean_line(raw);
        if !cleaned.is_empty() && !cleaned.contains(' ') {
            let entries = &self.entries;
            let sized = |spec: &TableSpec| resolve(entries, spec.dimension, i + 2).is_ok();
            if let Some(spec) = self.catalog.take_by_title(&cleaned, sized) {
                return self.value_table(i + 1, spec, Some(cleaned));
            }
        }

        self.standard_line(i)
    }

    fn standard_line(&mut self, i: usize) -> Result<Step> {
        let raw = self.lines[i];
        let (value, label, description) = match classify(raw, self.space_lists) {
            Line::Comment => return self.record(Entry::Comment(raw.to_string()), i + 1),
            Line::Scalar {
                value,
                label,
                description,
            } => (value, label, description),
        };

        if label.eq_ignore_ascii_case("kp_total") {
            self.space_lists = true;
        } else if label.eq_ignore_ascii_case("NumCoords") {
            if let Some(step) = self.airfoil_coordinates(i, &value, &label, &description)? {
                return Ok(step);
            }
        }

        if let Value::Str(token) = &value {
            if let Some(spec) = self.catalog.take_by_value(token) {
                return self.value_table(i, spec, None);
            }
        }
        if let Some(spec) = self.catalog.take_by_label(&label) {
            return self.label_table(i, spec, Scalar::new(label, value, description));
        }
        if let Some(spec) = self.catalog.file_table(&label) {
            return self.file_table(i, spec, Scalar::new(label, value, description));
        }

        self.record(Scalar::new(label, value, description).into(), i + 1)
    }

    /// Store an entry and check the text still looks like an input file.
    fn record(&mut self, entry: Entry, next: usize) -> Result<Step> {
        match entry.label() {
            None => self.comments += 1,
            Some(label) if !is_well_formed(label) => {
                self.wrong_labels += 1;
                // the first lines may hold a free form title
                if next > 3 && !label.is_empty() {
                    return Err(Error::NotThisFormat(format!(
                        "special character found in label `{label}` on line {next}"
                    )));
                }
            }
            Some(_) => {}
        }
        self.entries.push(entry);

        let total = self.lines.len() as f64;
        if self.comments as f64 > total * self.options.comment_ratio {
            return Err(Error::NotThisFormat(
                "most lines were read as comments".into(),
            ));
        }
        if self.wrong_labels as f64 > total * self.options.wrong_label_ratio {
            return Err(Error::NotThisFormat(
                "too many lines with malformed labels".into(),
            ));
        }
        Ok(Step::Next(next))
    }

    /// Integer value of the scalar sizing a table
    fn resolve(&self, dimension: Dimension, line: usize) -> Result<usize> {
        resolve(&self.entries, dimension, line)
    }

    /// Table whose header starts at `start`
    fn value_table(
        &mut self,
        start: usize,
        spec: &'static TableSpec,
        title: Option<String>,
    ) -> Result<Step> {
        let rows = self.resolve(spec.dimension, start + 1)?;
        let count = spec.header_lines + rows;
        debug!(table = spec.label, rows, line = start + 1, "reading table");

        let lines = span(&self.lines, start, count, spec.label, rows)?;
        let parsed = read_table(
            lines,
            Layout {
                first_line: start + 1,
                kind: spec.kind,
                header_lines: spec.header_lines,
                row_offset: 0,
                rows,
                dimension: &spec.dimension.to_string(),
            },
            &mut self.warnings,
        )?;

        let table = NumericTable {
            label: spec.label.to_string(),
            dimension: spec.dimension,
            columns: parsed.columns,
            units: parsed.units,
            rows: parsed.rows,
            style: style_of(spec),
            header_lines: spec.header_lines,
            title,
            preamble: Vec::new(),
        };
        self.record(table.into(), start + count)
    }

    /// Table introduced by the label of line `i`
    fn label_table(&mut self, i: usize, spec: &'static TableSpec, scalar: Scalar) -> Result<Step> {
        let polar = spec.detect.eq_ignore_ascii_case("NumAlf");
        let start = if polar { i + 1 } else { i };
        if polar || spec.row_offset > 0 {
            // the introducing scalar is kept, later tables may be sized by it
            self.entries.push(scalar.into());
        }

        let rows = self.resolve(spec.dimension, i + 1)?;
        let count = spec.header_lines + spec.row_offset + rows;
        debug!(table = spec.label, rows, line = start + 1, "reading table");

        let lines = span(&self.lines, start, count, spec.label, rows)?;
        let parsed = read_table(
            lines,
            Layout {
                first_line: start + 1,
                kind: spec.kind,
                header_lines: spec.header_lines,
                row_offset: spec.row_offset,
                rows,
                dimension: &spec.dimension.to_string(),
            },
            &mut self.warnings,
        )?;
        let preamble = lines
            .get(1..spec.row_offset)
            .unwrap_or_default()
            .iter()
            .map(|l| l.to_string())
            .collect();

        let table = NumericTable {
            label: spec.label.to_string(),
            dimension: spec.dimension,
            columns: parsed.columns,
            units: parsed.units,
            rows: parsed.rows,
            style: if polar {
                TableStyle::Commented
            } else {
                style_of(spec)
            },
            header_lines: spec.header_lines,
            title: None,
            preamble,
        };
        self.record(table.into(), start + count)
    }

    fn file_table(&mut self, i: usize, spec: &'static FileTableSpec, scalar: Scalar) -> Result<Step> {
        let rows = self.resolve(Dimension::Variable(spec.dimension), i + 1)?;
        if rows == 0 {
            return self.record(scalar.into(), i + 1);
        }

        let lines = span(&self.lines, i, rows, spec.label, rows)?;
        let filenames = read_file_table(lines, i + 1)?;
        let table = FileRefTable {
            label: spec.label.to_string(),
            dimension: spec.dimension.to_string(),
            filenames,
            description: scalar.description,
        };
        self.record(table.into(), i + rows)
    }

    /// Lines up to the next one starting with `END`, and the index of that line
    fn channel_lines(&self, start: usize) -> Result<(Vec<String>, usize)> {
        let mut end = start;
        while end < self.lines.len() && !self.lines[end].to_ascii_uppercase().starts_with("END") {
            if end - start >= self.options.max_outlist_lines {
                return Err(Error::BrokenTable {
                    line: end + 1,
                    message: format!(
                        "more than {} lines found in output list",
                        self.options.max_outlist_lines
                    ),
                });
            }
            end += 1;
        }
        let channels = self.lines[start..end].iter().map(|l| l.to_string()).collect();
        Ok((channels, end))
    }

    fn output_list(&mut self, i: usize) -> Result<Step> {
        let (word, description) = first_word(self.lines[i]).ok_or_else(|| Error::BrokenTable {
            line: i + 1,
            message: "output list without a label".into(),
        })?;
        let label = if self.nodal {
            format!("{word}_Nodal")
        } else {
            word.to_string()
        };
        let description = description.trim().to_string();

        let (channels, end) = self.channel_lines(i + 1)?;
        debug!(%label, channels = channels.len(), "read output list");
        self.entries.push(
            OutputChannelList {
                label: label.clone(),
                description,
                channels,
                titled: true,
            }
            .into(),
        );

        if end >= self.lines.len() {
            report(
                &mut self.warnings,
                format!("end of file reached while reading `{label}`"),
            );
            return Ok(Step::Stop);
        }

        let nodal_follows = self.lines.get(end + 2).is_some_and(|l| {
            let lower = l.to_ascii_lowercase();
            NODAL_MARKERS
                .iter()
                .any(|m| lower.find(m).is_some_and(|p| p > 0))
        });
        if nodal_follows {
            self.nodal = true;
            return Ok(Step::Next(end));
        }

        self.close();
        Ok(Step::Stop)
    }

    /// SubDyn style lists whose header line is an ordinary line
    fn sub_output_list(&mut self, i: usize, label: &str) -> Result<Step> {
        let header = self.line_entry(i);
        self.entries.push(header);

        let (channels, end) = self.channel_lines(i + 1)?;
        self.entries.push(
            OutputChannelList {
                label: label.to_string(),
                description: String::new(),
                channels,
                titled: false,
            }
            .into(),
        );
        if end >= self.lines.len() {
            report(
                &mut self.warnings,
                format!("end of file reached while reading `{label}`"),
            );
        }
        self.close();
        Ok(Step::Stop)
    }

    fn stiffness_block(&mut self, i: usize) -> Result<Step> {
        let header = self.line_entry(i);
        self.entries.push(header);

        let lines = span(&self.lines, i + 1, STIFFNESS_BLOCK_LINES, "KDAdd", STIFFNESS_BLOCK_LINES)?;
        let block = VerbatimBlock {
            label: "KDAdd".into(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        };
        self.entries.push(block.into());
        Ok(Step::Next(i + 1 + STIFFNESS_BLOCK_LINES))
    }

    fn beam_properties(&mut self, i: usize) -> Result<Step> {
        let header = self.line_entry(i);
        self.entries.push(header);

        let stations = self.resolve(Dimension::Variable("station_total"), i + 2)?;
        let table = read_beam_sections(&self.lines[i + 1..], i + 2, stations)?;
        debug!(stations, "read beam sections");
        self.entries.push(table.into());
        Ok(Step::Stop)
    }

    /// `NumCoords` followed by the reference point and the coordinates of an airfoil
    fn airfoil_coordinates(
        &mut self,
        i: usize,
        value: &Value,
        label: &str,
        description: &str,
    ) -> Result<Option<Step>> {
        let coords = match value {
            Value::Int(n) if *n > 0 => *n as usize,
            Value::Int(_) | Value::Str(_) => return Ok(None),
            other => {
                return Err(Error::BrokenTable {
                    line: i + 1,
                    message: format!("NumCoords must be an integer, found `{other}`"),
                })
            }
        };
        self.entries
            .push(Scalar::new(label, value.clone(), description).into());

        let rows = coords - 1;
        let lines = span(&self.lines, i + 1, 6 + 1 + rows, AIRFOIL_COORDINATES, rows)?.to_vec();

        for raw in &lines[..3] {
            let entry = self.line_entry_of(raw);
            self.entries.push(entry);
        }

        let reference = clean_line(lines[3]);
        let point = clean_after(&reference, '!')
            .split([' ', ',', '\t'])
            .filter(|t| !t.is_empty())
            .take(2)
            .map(|t| t.parse::<f64>().ok().map(Value::Float))
            .collect::<Option<Vec<_>>>()
            .filter(|p| p.len() == 2)
            .ok_or_else(|| Error::BrokenTable {
                line: i + 5,
                message: "cannot read the airfoil reference point".into(),
            })?;
        self.entries
            .push(Scalar::new("AirfoilRefPoint", point, "").into());

        for raw in &lines[4..6] {
            let entry = self.line_entry_of(raw);
            self.entries.push(entry);
        }

        let parsed = read_table(
            &lines[6..],
            Layout {
                first_line: i + 8,
                kind: TableKind::Numeric,
                header_lines: 1,
                row_offset: 0,
                rows,
                dimension: "NumCoords",
            },
            &mut self.warnings,
        )?;
        let units = vec![wrap_unit("-"); parsed.columns.len()];
        self.entries.push(
            NumericTable {
                label: AIRFOIL_COORDINATES.into(),
                dimension: Dimension::Variable("NumCoords"),
                columns: parsed.columns,
                units: Some(units),
                rows: parsed.rows,
                style: TableStyle::Commented,
                header_lines: 1,
                title: None,
                preamble: Vec::new(),
            }
            .into(),
        );
        Ok(Some(Step::Stop))
    }

    fn line_entry(&self, i: usize) -> Entry {
        self.line_entry_of(self.lines[i])
    }

    fn line_entry_of(&self, raw: &str) -> Entry {
        match classify(raw, self.space_lists) {
            Line::Comment => Entry::Comment(raw.to_string()),
            Line::Scalar {
                value,
                label,
                description,
            } => Scalar::new(label, value, description).into(),
        }
    }

    /// Input files end right after their output list
    fn close(&mut self) {
        self.entries.push(Entry::Comment(END_LINE.into()));
        self.entries.push(Entry::Comment(SEPARATOR_LINE.into()));
    }

    fn check_duplicates(&mut self) {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for label in self.entries.iter().filter_map(Entry::label) {
            *counts.entry(label).or_default() += 1;
        }
        let duplicates = counts
            .iter()
            .filter(|(label, count)| **count > 1 && **label != "OutList" && label.trim() != "-")
            .map(|(label, _)| *label)
            .collect::<Vec<_>>();

        if !duplicates.is_empty() {
            let message = format!(
                "duplicate labels found: {}, they should be made unique",
                duplicates.join(", ")
            );
            report(&mut self.warnings, message);
        }
    }
}

/// Lines `start..start + count`, failing when the file is shorter
fn span<'a, 'l>(
    lines: &'l [&'a str],
    start: usize,
    count: usize,
    label: &str,
    rows: usize,
) -> Result<&'l [&'a str]> {
    lines
        .get(start..start + count)
        .ok_or_else(|| Error::RowCountMismatch {
            line: start + 1,
            label: label.to_string(),
            expected: rows,
            found: rows.saturating_sub(start + count - lines.len()),
        })
}

fn style_of(spec: &TableSpec) -> TableStyle {
    match spec.kind {
        TableKind::Numeric => TableStyle::Aligned,
        TableKind::Mixed => TableStyle::Plain,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::entry::{Entry, FileRefTable};
    use crate::error::{Error, Result};
    use crate::parse::{parse, ParseOptions};

    #[test]
    fn stiffness_block_is_kept_whole() -> Result<()> {
        let mut text = String::from(
            "---------------------- HYDRODYN -----------------------------------\n\
             200   WtrDpth   - Water depth (meters)\n\
             0     MSL2SWL   - Offset between still-water level and mean sea level (meters)\n\
             ---------------------- ADDITIONAL STIFFNESS AND DAMPING ---------------\n",
        );
        for i in 0..19 {
            text.push_str(&format!("0   0   0   0   0   0   Add{i}\n"));
        }
        text.push_str("1   NMembers  - Number of members (-)\n");

        let (entries, _) = parse(&text, ParseOptions::default())?;
        let Entry::Block(block) = &entries[4] else {
            panic!("expected a block, found {:?}", entries[4]);
        };
        assert_eq!(block.label, "KDAdd");
        assert_eq!(block.lines.len(), 19);
        assert_eq!(block.lines[18], "0   0   0   0   0   0   Add18");
        assert_eq!(entries[5].label(), Some("NMembers"));
        Ok(())
    }

    #[test]
    fn file_name_list() -> Result<()> {
        let text = "\
------- AERODYN v14 --------------------------------
\"BEDDOES\"   StallMod    - Dynamic stall included (switch)
          3   NumFoil     - Number of airfoil files (-)
\"AeroData/Cylinder1.dat\"    FoilNm      - Names of the airfoil files [NumFoil lines] (quoted strings)
\"AeroData/Cylinder2.dat\"
\"AeroData/DU40_A17.dat\"
         17   BldNodes    - Number of blade nodes used for analysis (-)
";
        let (entries, _) = parse(text, ParseOptions::default())?;
        assert_eq!(
            entries[3],
            Entry::FileTable(FileRefTable {
                label: "FoilNm".into(),
                dimension: "NumFoil".into(),
                filenames: vec![
                    "\"AeroData/Cylinder1.dat\"".into(),
                    "\"AeroData/Cylinder2.dat\"".into(),
                    "\"AeroData/DU40_A17.dat\"".into(),
                ],
                description: "- Names of the airfoil files [NumFoil lines] (quoted strings)".into(),
            })
        );
        assert_eq!(entries[4].label(), Some("BldNodes"));
        assert_eq!(
            entries[3].to_string(),
            "\"AeroData/Cylinder1.dat\" FoilNm - Names of the airfoil files [NumFoil lines] (quoted strings)\n\
             \"AeroData/Cylinder2.dat\"\n\
             \"AeroData/DU40_A17.dat\""
        );
        Ok(())
    }

    #[test]
    fn long_output_list() {
        let text = "\
------- SERVODYN --------
3    NumBl     - Number of blades (-)
True SumPrint  - Print summary (flag)
     OutList   - The next line(s) contains a list of output parameters.  See OutListParameters.xlsx for a listing of available output channels, (-)
\"GenPwr\"
\"GenTq\"
\"BlPitchC1\"
END of input file (the word \"END\" must appear in the first 3 columns of this last OutList line)
";
        let options = ParseOptions::builder().max_outlist_lines(2).build();
        assert!(matches!(
            parse(text, options),
            Err(Error::BrokenTable { line: 7, .. })
        ));
        assert!(parse(text, ParseOptions::default()).is_ok());
    }

    #[test]
    fn coordinates_need_an_integer_count() {
        let text = "\
! ------------ AirfoilInfo v1.01.x Input File ----------------------------------
\"DEFAULT\"     InterpOrd    ! Interpolation order
          1   NonDimArea   ! The non-dimensional area of the airfoil
        2.5   NumCoords    ! The number of coordinates in the airfoil shape file
";
        assert!(matches!(
            parse(text, ParseOptions::default()),
            Err(Error::BrokenTable { line: 4, .. })
        ));
    }

    #[test]
    fn empty_text() {
        assert!(matches!(
            parse("  \n\n", ParseOptions::default()),
            Err(Error::NotThisFormat(_))
        ));
    }
}
