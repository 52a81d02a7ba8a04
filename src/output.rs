use std::{
    convert::Infallible,
    fs::File,
    io::{BufWriter, Write, stdout},
    path::PathBuf,
    str::FromStr,
};

use csv::WriterBuilder;

use crate::{core::cost::CostRecord, prelude::*};

pub const HEADER: [&str; 10] = [
    "SessionId",
    "Timestamp",
    "Energy",
    "EnergyUsageFee",
    "NetUsageFee",
    "EnergyCost",
    "NetUsageCost",
    "TotalCostNoVat",
    "TotalCostWithVAT",
    "CostCurrency",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl FromStr for OutputTarget {
    type Err = Infallible;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Ok(if path == "-" { Self::Stdout } else { Self::File(PathBuf::from(path)) })
    }
}

impl OutputTarget {
    #[must_use]
    pub const fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    #[instrument(skip_all, fields(target = ?self, n_records = records.len()))]
    pub fn write(&self, records: &[CostRecord]) -> Result {
        match self {
            Self::Stdout => write_csv(records, stdout().lock()),
            Self::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create `{}`", path.display()))?;
                write_csv(records, BufWriter::new(file))
                    .with_context(|| format!("failed to write `{}`", path.display()))
            }
        }?;
        info!("written");
        Ok(())
    }
}

/// Write the header and then one row per record, the header is written even without records.
pub fn write_csv(records: &[CostRecord], writer: impl Write) -> Result {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
