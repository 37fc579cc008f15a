//! Binary output files as tables

use std::io::Cursor;

use fast_outb::{OutbWriter, OutbWriterOptions, OutputFile, Samples};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::table::{Column, Table};

/// Encode ready channels, time first
#[derive(Debug, Clone, PartialEq)]
pub struct Channels {
    pub names: Vec<String>,
    pub units: Vec<String>,
    pub samples: Samples,
}

impl Channels {
    /// Encode into a binary output file held in memory.
    pub fn encode(&self, options: OutbWriterOptions) -> Result<Vec<u8>> {
        let writer = OutbWriter::new(Cursor::new(Vec::new()), options);
        Ok(writer
            .write(&self.samples, &self.names, &self.units)?
            .into_inner())
    }
}

impl Table {
    /// One column per channel, `sec` units written `s`
    #[instrument(skip_all, fields(channels = file.channel_count()))]
    pub fn from_output(file: &OutputFile) -> Table {
        let columns = file
            .channel_names
            .iter()
            .zip(&file.channel_units)
            .enumerate()
            .map(|(i, (name, unit))| {
                Column::new(
                    name.as_str(),
                    unit.replace("sec", "s"),
                    file.samples.column(i).collect::<Vec<_>>(),
                )
            })
            .collect();

        let name = if file.description.is_empty() {
            "Output".to_string()
        } else {
            file.description.clone()
        };
        Table::with_columns(name, columns)
    }

    /// Channels for [`OutbWriter`], the first column must be time.
    #[instrument(skip_all, err, fields(table = %self.name))]
    pub fn into_channels(&self) -> Result<Channels> {
        let first = self
            .columns
            .first()
            .ok_or_else(|| Error::MissingTime(String::new()))?;
        if !first.name.eq_ignore_ascii_case("time") {
            return Err(Error::MissingTime(first.name.clone()));
        }

        self.check_columns()?;
        let columns = self
            .columns
            .iter()
            .map(Column::numbers)
            .collect::<Result<Vec<_>>>()?;
        let samples = Samples::from_columns(&columns)?;
        debug!(shape = ?samples.shape(), "table to channels");

        let mut names: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        // writers expect the exact spelling
        names[0] = "Time".into();
        Ok(Channels {
            names,
            units: self.columns.iter().map(|c| c.unit.clone()).collect(),
            samples,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::Error;
    use crate::table::{Column, Table};

    #[test]
    fn time_comes_first() {
        let table = Table::with_columns(
            "t",
            vec![
                Column::new("Wind", "m/s", vec![1.0, 2.0]),
                Column::new("Time", "s", vec![0.0, 1.0]),
            ],
        );
        assert!(matches!(table.into_channels(), Err(Error::MissingTime(n)) if n == "Wind"));
        assert!(matches!(
            Table::new("empty").into_channels(),
            Err(Error::MissingTime(_))
        ));
    }

    #[test]
    fn channels_keep_units() -> crate::error::Result<()> {
        let table = Table::with_columns(
            "t",
            vec![
                Column::new("time", "s", vec![0.0, 0.5]),
                Column::new("GenPwr", "kW", vec![10.0, 12.0]),
            ],
        );
        let channels = table.into_channels()?;
        assert_eq!(channels.names, ["Time", "GenPwr"]);
        assert_eq!(channels.units, ["s", "kW"]);
        assert_eq!(channels.samples.row(1), Some(&[0.5, 12.0][..]));
        Ok(())
    }
}
