use std::path::PathBuf;

use fast_input::{
    error::{Error, Result},
    parse::{END_LINE, SEPARATOR_LINE},
    Entry, InputFile, ParseOptions, Rows, TableStyle, Value,
};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;
use walkdir::WalkDir;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}/resources/{name}",
        env!("CARGO_MANIFEST_DIR")
    ))
}

#[traced_test]
#[test]
fn table_announced_by_its_name() -> Result<()> {
    let text = "\
3   NumBlNds   comment
BldAeroNodes
r     chord
(m)   (m)
1.0   0.5
2.0   0.4
3.0   0.3
";
    let file = InputFile::parse(text)?;

    assert_eq!(file.entries().len(), 2);
    let scalar = file.get_scalar("NumBlNds")?;
    assert_eq!(scalar.value, Value::Int(3));
    assert_eq!(scalar.description, "comment");

    let table = file.get_table("BldAeroNodes")?;
    assert_eq!(table.shape(), (3, 2));
    assert_eq!(table.columns, ["r", "chord"]);
    assert_eq!(table.units.as_deref(), Some(&["(m)".to_string(), "(m)".to_string()][..]));
    assert_eq!(table.rows, Rows::Numeric(vec![vec![1.0, 0.5], vec![2.0, 0.4], vec![3.0, 0.3]]));
    assert_eq!(table.title.as_deref(), Some("BldAeroNodes"));
    Ok(())
}

#[traced_test]
#[test]
fn table_announced_by_its_header() -> Result<()> {
    let file = InputFile::read(resource("AeroDyn_blade.dat"))?;

    assert_eq!(file.get_int("NumBlNds")?, 8);
    let table = file.get_table("BldAeroNodes")?;
    assert_eq!(table.shape(), (8, 7));
    assert_eq!(table.columns[0], "BlSpn");
    assert_eq!(table.columns[6], "BlAFID");
    assert_eq!(table.style, TableStyle::Aligned);
    assert_eq!(table.column("BlChord").map(|c| c[7]), Some(4.249));
    assert_eq!(table.column("BlAFID").map(|c| c[7]), Some(5.0));
    assert!(file.warnings().is_empty());
    Ok(())
}

#[traced_test]
#[test]
fn missing_dimension() {
    let result = InputFile::read(resource("AeroDyn_blade_missing_dimension.dat"));

    match result {
        Err(Error::DimensionUnresolved { line, variable, .. }) => {
            assert_eq!(line, 5);
            assert_eq!(variable, "NumBlNds");
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn non_integer_dimension() {
    let text = "\
------- BLADE --------
2.5   NumBlNds  - Number of blade nodes (-)
0     Other     - Something else
BlSpn   BlChord
(m)     (m)
0.0     1.0
";
    assert!(matches!(
        InputFile::parse(text),
        Err(Error::DimensionUnresolved { variable, reason, .. })
            if variable == "NumBlNds" && reason.contains("not an integer")
    ));
}

#[test]
fn file_shorter_than_table() {
    let text = "\
------- BLADE --------
4     NumBlNds  - Number of blade nodes (-)
0     Other     - Something else
BlSpn   BlChord
(m)     (m)
0.0     1.0
1.0     0.8
";
    assert!(matches!(
        InputFile::parse(text),
        Err(Error::RowCountMismatch { expected: 4, found: 2, .. })
    ));
}

#[test]
fn title_without_its_size_is_a_comment() -> Result<()> {
    let text = "\
------- SUBDYN INPUT FILE -------
Joints
False         Echo        - Echo input data (flag)
0.01          SDdeltaT    - Local integration step (s)
3             IntMethod   - Integration method (switch)
True          SttcSolve   - Solve dynamics about static equilibrium point (flag)
3             NDiv        - Number of sub-elements per member (-)
";
    let file = InputFile::parse(text)?;

    assert_eq!(file.entries()[1], Entry::Comment("Joints".into()));
    assert!(file.get("Joints").is_none());
    assert_eq!(file.get_int("NDiv")?, 3);
    Ok(())
}

#[traced_test]
#[test]
fn latin1_comment() -> Result<()> {
    let mut bytes = b"------- ELASTODYN INPUT FILE -------\n".to_vec();
    bytes.extend_from_slice(b"0.0           Azimuth     - Initial azimuth position (\xB0)\n");
    bytes.extend_from_slice(b"3             NumBl       - Number of blades (-)\n");
    bytes.extend_from_slice(b"63.0          TipRad      - Blade tip radius (m)\n");
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("latin1_comment.dat");
    std::fs::write(&path, &bytes)?;

    let file = InputFile::read(&path)?;

    assert_eq!(file.get_scalar("Azimuth")?.description, "- Initial azimuth position (\u{b0})");
    assert_eq!(file.get_int("NumBl")?, 3);
    assert!(logs_contain("reading as Latin-1"));
    Ok(())
}

#[test]
fn binary_is_not_this_format() {
    // an .outb header: format 2, one channel, three samples
    let outb = [
        0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    assert!(matches!(InputFile::from_bytes(&outb), Err(Error::NotThisFormat(_))));

    let controls: Vec<u8> = (0..64).map(|i| if i % 4 == 0 { 0x1b } else { b'a' }).collect();
    assert!(matches!(
        InputFile::from_bytes(&controls),
        Err(Error::NotThisFormat(reason)) if reason.contains("control characters")
    ));

    assert!(matches!(InputFile::from_bytes(b""), Err(Error::NotThisFormat(_))));
}

#[test]
fn prose_is_rejected() {
    let text = "\
# Notes

The wind turbine was installed in 2012.

# Maintenance

Blades were replaced twice.
";
    assert!(matches!(InputFile::parse(text), Err(Error::NotThisFormat(_))));
}

#[test]
fn special_characters_are_rejected() {
    let text = "\
------- ELASTODYN --------
3    NumBl     - Number of blades (-)
63   TipRad    - Tip radius (m)
1.5  HubRad    - Hub radius (m)
2    e-mail@   - Contact
0    Azimuth   - Initial azimuth (deg)
0    ShftTilt  - Shaft tilt (deg)
";
    assert!(matches!(
        InputFile::parse(text),
        Err(Error::NotThisFormat(reason)) if reason.contains("e-mail@")
    ));
}

#[test]
fn thresholds_are_configurable() -> Result<()> {
    let text = "\
------- ELASTODYN --------
---- ROTOR ----
3    NumBl     - Number of blades (-)
63   TipRad    - Tip radius (m)
";
    assert!(InputFile::parse(text).is_err());

    let options = ParseOptions::builder().comment_ratio(0.6).build();
    let file = InputFile::parse_with(text, options)?;
    assert_eq!(file.get_int("NumBl")?, 3);
    Ok(())
}

#[traced_test]
#[test]
fn output_lists() -> Result<()> {
    let file = InputFile::read(resource("ElastoDyn.dat"))?;

    assert!(!file.get_bool("Echo")?);
    assert_eq!(file.get_str("DT")?, "\"DEFAULT\"");
    assert_eq!(file.get_float("RotSpeed")?, 12.1);
    assert_eq!(
        file.get_scalar("NacCMxn")?.value,
        Value::List(vec![Value::Float(0.0), Value::Float(0.0)])
    );

    let Some(Entry::OutputList(outputs)) = file.get("OutList") else {
        panic!("missing OutList");
    };
    assert_eq!(
        outputs.names(),
        ["OoPDefl1", "IPDefl1", "BldPitch1", "RotSpeed", "GenSpeed"]
    );

    let Some(Entry::OutputList(nodal)) = file.get("OutList_Nodal") else {
        panic!("missing OutList_Nodal");
    };
    assert_eq!(nodal.names(), ["TDx", "TDy"]);
    assert_eq!(file.get_int("BldNd_BladesOut")?, 1);

    let tail = &file.entries()[file.entries().len() - 2..];
    assert_eq!(
        tail,
        [
            Entry::Comment(END_LINE.to_string()),
            Entry::Comment(SEPARATOR_LINE.to_string())
        ]
    );
    assert!(!logs_contain("duplicate labels"));
    Ok(())
}

#[traced_test]
#[test]
fn unterminated_output_list() -> Result<()> {
    let text = "\
------- SERVODYN --------
3    NumBl     - Number of blades (-)
63   TipRad    - Tip radius (m)
True SumPrint  - Print summary (flag)
     OutList   - The next line(s) contains a list of output parameters.  See OutListParameters.xlsx for a listing of available output channels, (-)
\"GenPwr\"
\"GenTq\"
";
    let file = InputFile::parse(text)?;

    let Some(Entry::OutputList(outputs)) = file.get("OutList") else {
        panic!("missing OutList");
    };
    assert_eq!(outputs.channels.len(), 2);
    assert!(logs_contain("end of file reached while reading `OutList`"));
    Ok(())
}

#[traced_test]
#[test]
fn beam_sections() -> Result<()> {
    let file = InputFile::read(resource("BeamDyn_blade.dat"))?;

    assert_eq!(file.get_int("station_total")?, 3);
    let damping = file.get_table("DampingCoeffs")?;
    assert_eq!(damping.shape(), (1, 6));

    let Some(Entry::BeamSections(sections)) = file.get("BeamProperties") else {
        panic!("missing BeamProperties");
    };
    assert_eq!(sections.span, [0.0, 0.5, 1.0]);
    assert_eq!(sections.stiffness[0][0][0], 1.368e9);
    assert_eq!(sections.stiffness[0][4][5], -5.0e8);
    assert_eq!(sections.mass[0][3][3], 973.04);
    assert_eq!(sections.mass[2][0][0], 678.935 * 0.6);
    Ok(())
}

#[traced_test]
#[test]
fn station_total_beyond_the_file() -> Result<()> {
    let text = std::fs::read_to_string(resource("BeamDyn_blade.dat"))?.replace(
        "          3   station_total",
        "100000000000000   station_total",
    );

    match InputFile::parse(&text) {
        Err(Error::BrokenTable { message, .. }) => {
            assert_eq!(message, "cannot read section 4/100000000000000");
        }
        other => panic!("unexpected result {other:?}"),
    }
    Ok(())
}

#[traced_test]
#[test]
fn airfoil_polar() -> Result<()> {
    let file = InputFile::read(resource("Polar_DU40.dat"))?;

    assert_eq!(file.get_int("NumCoords")?, 0);
    assert_eq!(file.get_int("NumAlf")?, 12);
    let polar = file.get_table("AFCoeff")?;
    assert_eq!(polar.shape(), (12, 4));
    assert_eq!(polar.columns, ["Alpha", "Cl", "Cd", "Cm"]);
    assert_eq!(polar.style, TableStyle::Commented);
    assert_eq!(polar.column("Cl").map(|c| c[6]), Some(0.852));
    Ok(())
}

#[traced_test]
#[test]
fn airfoil_coordinates() -> Result<()> {
    let file = InputFile::read(resource("Airfoil_coords.dat"))?;

    assert_eq!(
        file.get_scalar("AirfoilRefPoint")?.value,
        Value::List(vec![Value::Float(0.25), Value::Float(0.0)])
    );
    let shape = file.get_table("AirfoilCoord")?;
    assert_eq!(shape.shape(), (5, 2));
    assert_eq!(shape.columns, ["x/c", "y/c"]);
    assert_eq!(
        shape.units.as_deref(),
        Some(&["(-)".to_string(), "(-)".to_string()][..])
    );
    assert_eq!(shape.column("y/c").map(|c| c[1]), Some(0.067));
    Ok(())
}

#[traced_test]
#[test]
fn substructure() -> Result<()> {
    let file = InputFile::read(resource("SubDyn.dat"))?;

    let guyan = file.get_table("GuyanDampMatrix")?;
    assert_eq!(guyan.shape(), (6, 6));
    assert_eq!(guyan.header_lines, 0);
    assert_eq!(guyan.values().map(|v| v[5][5]), Some(3.0e7));
    assert_eq!(file.get_int("GuyanDampSize")?, 6);

    assert_eq!(file.get_table("Joints")?.shape(), (3, 9));
    assert_eq!(file.get_table("InterfaceJoints")?.shape(), (1, 7));
    assert_eq!(file.get_table("Members")?.shape(), (2, 6));

    let reactions = file.get_table("BaseJoints")?;
    assert_eq!(reactions.columns.last().map(String::as_str), Some("SSIfile"));
    assert!(matches!(&reactions.rows, Rows::Mixed(rows) if rows[0][7] == "\"\""));

    // both property tables are introduced by `YoungE`
    assert_eq!(file.get_table("BeamProp")?.shape(), (2, 6));
    let extra = file.get_table("BeamPropX")?;
    assert_eq!(extra.shape(), (0, 10));
    assert_eq!(extra.columns.last().map(String::as_str), Some("XsecJ0"));

    // more node counts than the header names
    let outs = file.get_table("MemberOuts")?;
    assert_eq!(outs.columns, ["MemberID", "NOutCnt", "NodeCnt", "Col"]);

    let Some(Entry::OutputList(outputs)) = file.get("SDOutList") else {
        panic!("missing SDOutList");
    };
    assert!(!outputs.titled);
    assert_eq!(
        outputs.names(),
        ["M1N1FKZe", "M2N1FKZe", "ReactFXss", "ReactFYss"]
    );
    assert!(file.warnings().is_empty());
    Ok(())
}

#[traced_test]
#[test]
fn duplicate_labels_warn() -> Result<()> {
    let text = "\
------- HYDRODYN --------
1025   WtrDens   - Water density (kg/m^3)
200    WtrDpth   - Water depth (meters)
0      MSL2SWL   - Offset (meters)
1025   WtrDens   - Water density again (kg/m^3)
";
    let file = InputFile::parse(text)?;

    assert_eq!(file.get_int("WtrDens")?, 1025);
    assert_eq!(file.get_all("WtrDens").count(), 2);
    assert_eq!(file.warnings().len(), 1);
    assert!(logs_contain("duplicate labels found: WtrDens"));
    Ok(())
}

#[traced_test]
#[test]
fn all_resources_parse() -> Result<()> {
    let root = format!("{}/resources", env!("CARGO_MANIFEST_DIR"));
    let mut parsed = 0;
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().contains("missing"))
    {
        let file = InputFile::read(entry.path())?;
        assert!(!file.entries().is_empty(), "{}", entry.path().display());
        file.check_dimensions()?;
        parsed += 1;
    }
    assert_eq!(parsed, 6);
    Ok(())
}
