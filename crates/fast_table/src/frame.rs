//! Conversion to polars data frames

use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::error::Result;
use crate::table::{Table, Values};

impl Table {
    /// One series per column, named by column label
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        self.check_columns()?;
        let series = self
            .columns
            .iter()
            .map(|column| {
                let name = column.label();
                match &column.values {
                    Values::Numeric(values) => Series::new(name.into(), values.as_slice()),
                    Values::Text(values) => Series::new(name.into(), values.as_slice()),
                }
            })
            .map(Into::into)
            .collect();
        Ok(DataFrame::new(series)?)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::table::{Column, Table};

    #[test]
    fn frame_columns() -> Result<()> {
        let table = Table::with_columns(
            "airfoils",
            vec![
                Column::new("Span", "m", vec![0.0, 1.0]),
                Column::new("FoilNm", "", vec!["a.dat".to_string(), "b.dat".to_string()]),
            ],
        );
        let frame = table.to_dataframe()?;
        assert_eq!(frame.shape(), (2, 2));
        assert!(frame.column("Span_[m]").is_ok());
        assert!(frame.column("FoilNm").is_ok());
        Ok(())
    }
}
