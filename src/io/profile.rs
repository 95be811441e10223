//! CSV demand-profile loading.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Loads a demand power trace (kW) from a CSV file.
///
/// The file must have a header row containing a `power_kw` column; all
/// other columns are ignored. One sample per row, in timestep order.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be read, the `power_kw`
/// column is missing, or any sample fails to parse as a number.
pub fn load_profile_csv(path: &Path) -> io::Result<Vec<f64>> {
    let file = File::open(path)?;
    read_profile_csv(file)
}

/// Reads a demand power trace (kW) from any reader. See [`load_profile_csv`].
///
/// # Errors
///
/// Returns an `io::Error` on malformed CSV, a missing `power_kw` column,
/// or an unparsable sample.
pub fn read_profile_csv(reader: impl Read) -> io::Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

    let headers = rdr.headers().map_err(invalid_data)?;
    let col = headers
        .iter()
        .position(|h| h.trim() == "power_kw")
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "profile CSV is missing a \"power_kw\" column",
            )
        })?;

    let mut samples = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(invalid_data)?;
        let raw = record.get(col).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("profile row {} has no power_kw field", i + 1),
            )
        })?;
        let kw: f64 = raw.trim().parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("profile row {}: cannot parse \"{raw}\" as power_kw", i + 1),
            )
        })?;
        samples.push(kw);
    }

    Ok(samples)
}

fn invalid_data(e: csv::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}
