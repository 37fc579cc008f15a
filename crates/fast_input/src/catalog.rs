//! Known table families and how they announce themselves
//!
//! FAST files carry no table markers. A table is recognised either by the value of its first
//! header line (`BlSpn  BlCrvAC ...`) or by the label of the line that introduces it
//! (`MemberID  MJointID1 ...`), and is sized by a scalar parsed earlier in the file. Several
//! families share a trigger, so every entry is used at most once per file.

use derive_more::derive::Display;

/// How a table is sized
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// A constant number of rows
    Fixed(usize),
    /// The integer value of an earlier scalar
    Variable(&'static str),
}

/// How table cells are read
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Every cell is a number, booleans and print flags read as 0 or 1
    Numeric,
    /// Cells are kept as text unless all of them are numbers
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Token that triggers the table, compared without case
    pub detect: &'static str,
    pub dimension: Dimension,
    /// Label the parsed table is stored under
    pub label: &'static str,
    /// Column name line and unit line count, 0 when the columns are counted from the data
    pub header_lines: usize,
    /// Lines between the trigger and the first data line for tables without header
    pub row_offset: usize,
    pub kind: TableKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTableSpec {
    pub detect: &'static str,
    pub dimension: &'static str,
    pub label: &'static str,
}

const fn by_value(
    detect: &'static str,
    dimension: Dimension,
    label: &'static str,
    header_lines: usize,
    kind: TableKind,
) -> TableSpec {
    TableSpec {
        detect,
        dimension,
        label,
        header_lines,
        row_offset: 0,
        kind,
    }
}

const fn by_label(
    detect: &'static str,
    dimension: Dimension,
    label: &'static str,
    header_lines: usize,
    row_offset: usize,
    kind: TableKind,
) -> TableSpec {
    TableSpec {
        detect,
        dimension,
        label,
        header_lines,
        row_offset,
        kind,
    }
}

use Dimension::{Fixed, Variable};
use TableKind::{Mixed, Numeric};

/// Tables whose first header line starts with the detected token
pub static VALUE_TABLES: &[TableSpec] = &[
    by_value("HtFract", Variable("NTwInpSt"), "TowProp", 2, Numeric),
    by_value("TwrElev", Variable("NumTwrNds"), "TowProp", 2, Numeric),
    by_value("BlFract", Variable("NBlInpSt"), "BldProp", 2, Numeric),
    by_value("Genspd_TLU", Variable("DLL_NumTrq"), "DLLProp", 2, Numeric),
    by_value("BlSpn", Variable("NumBlNds"), "BldAeroNodes", 2, Numeric),
    by_value("WndSpeed", Variable("NumCases"), "Cases", 2, Numeric),
    by_value("HvCoefID", Variable("NHvCoef"), "HvCoefs", 2, Numeric),
    by_value("AxCoefID", Variable("NAxCoef"), "AxCoefs", 2, Numeric),
    by_value("JointID", Variable("NJoints"), "Joints", 2, Numeric),
    by_value("Dpth", Variable("NCoefDpth"), "DpthProp", 2, Numeric),
    by_value("FillNumM", Variable("NFillGroups"), "FillGroups", 2, Numeric),
    by_value("MGDpth", Variable("NMGDepths"), "MGProp", 2, Numeric),
    by_value("SimplCd", Fixed(1), "SmplProp", 2, Numeric),
    by_value("RNodes", Variable("BldNodes"), "BldAeroNodes", 1, Mixed),
    by_value("kp_xr", Variable("kp_total"), "MemberGeom", 2, Numeric),
    by_value("mu1", Fixed(1), "DampingCoeffs", 2, Numeric),
    by_value("TwrHtFr", Variable("NTwrHt"), "TowerProp", 1, Numeric),
    by_value("TwrRe", Variable("NTwrRe"), "TowerRe", 1, Numeric),
    by_value("WT_X", Variable("NumTurbines"), "WindTurbines", 2, Mixed),
    by_value("RJointID", Variable("NReact"), "BaseJoints", 2, Mixed),
    by_value("IJointID", Variable("NInterf"), "InterfaceJoints", 2, Numeric),
    by_value("COSMID", Variable("NCOSMs"), "MemberCosineMatrix", 2, Numeric),
    by_value("CMJointID", Variable("NCmass"), "ConcentratedMasses", 2, Numeric),
];

/// Tables introduced by the label of their first line
pub static LABEL_TABLES: &[TableSpec] = &[
    by_label("NumAlf", Variable("NumAlf"), "AFCoeff", 2, 0, Numeric),
    by_label("F_X", Variable("NKInpSt"), "TMDspProp", 2, 0, Numeric),
    by_label("MemberCd1", Variable("NCoefMembers"), "MemberProp", 2, 0, Numeric),
    by_label("MJointID1", Variable("NMembers"), "Members", 2, 0, Mixed),
    by_label("NOutLoc", Variable("NMOutputs"), "MemberOuts", 2, 0, Numeric),
    by_label("NOutCnt", Variable("NMOutputs"), "MemberOuts", 2, 0, Numeric),
    by_label("PropD", Variable("NPropSets"), "SectionProp", 2, 0, Numeric),
    by_label("Diam", Variable("NTypes"), "LineTypes", 2, 0, Mixed),
    by_label("Type", Variable("NConnects"), "ConnectionProp", 2, 0, Mixed),
    by_label("LineType", Variable("NLines"), "LineProp", 2, 0, Mixed),
    by_label("GuyanDampSize", Fixed(6), "GuyanDampMatrix", 0, 1, Numeric),
    by_label("YoungE", Variable("NPropSets"), "BeamProp", 2, 0, Numeric),
    by_label("YoungE", Variable("NXPropSets"), "BeamPropX", 2, 0, Numeric),
    by_label("EA", Variable("NCablePropSets"), "CableProp", 2, 0, Numeric),
    by_label("MatDens", Variable("NRigidPropSets"), "RigidProp", 2, 0, Numeric),
    by_label("GridName", Variable("nGridOut"), "GridOutputs", 0, 2, Mixed),
];

/// Lists of file names, one per line, the first sharing the line of the label
pub static FILE_TABLES: &[FileTableSpec] = &[
    FileTableSpec {
        detect: "FoilNm",
        dimension: "NumFoil",
        label: "FoilNm",
    },
    FileTableSpec {
        detect: "AFNames",
        dimension: "NumAFfiles",
        label: "AFNames",
    },
];

/// Parser local view of the catalog, entries are consumed as tables are found
#[derive(Debug, Clone)]
pub struct Catalog {
    value_used: Vec<bool>,
    label_used: Vec<bool>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            value_used: vec![false; VALUE_TABLES.len()],
            label_used: vec![false; LABEL_TABLES.len()],
        }
    }
}

impl Catalog {
    /// Table whose first header line starts with `value`
    pub fn take_by_value(&mut self, value: &str) -> Option<&'static TableSpec> {
        take(VALUE_TABLES, &mut self.value_used, |spec| {
            spec.detect.eq_ignore_ascii_case(value)
        })
    }

    /// Table announced by a line holding only its label, the header following on the next line
    ///
    /// Only tables for which `sized` holds are taken, so a free form title sharing a label is
    /// left alone until the scalar sizing the table has been read.
    pub fn take_by_title(
        &mut self,
        title: &str,
        sized: impl Fn(&TableSpec) -> bool,
    ) -> Option<&'static TableSpec> {
        take(VALUE_TABLES, &mut self.value_used, |spec| {
            spec.label.eq_ignore_ascii_case(title) && sized(spec)
        })
    }

    /// Table introduced by a line labelled `label`
    pub fn take_by_label(&mut self, label: &str) -> Option<&'static TableSpec> {
        take(LABEL_TABLES, &mut self.label_used, |spec| {
            spec.detect.eq_ignore_ascii_case(label)
        })
    }

    /// File name lists may appear several times and are never consumed
    pub fn file_table(&self, label: &str) -> Option<&'static FileTableSpec> {
        FILE_TABLES
            .iter()
            .find(|spec| spec.detect.eq_ignore_ascii_case(label))
    }
}

fn take(
    specs: &'static [TableSpec],
    used: &mut [bool],
    matches: impl Fn(&TableSpec) -> bool,
) -> Option<&'static TableSpec> {
    let index = specs
        .iter()
        .zip(used.iter())
        .position(|(spec, used)| !used && matches(spec))?;
    used[index] = true;
    Some(&specs[index])
}
