//! CSV export for simulation step results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepResult;

/// Schema v1 column header for CSV telemetry export.
const HEADER: &str = "timestep,time_s,demand_kw,battery_kw,supercap_kw,\
                      battery_i_a,battery_v,battery_soc_pct,\
                      supercap_i_a,supercap_v,supercap_soc_pct,\
                      battery_reject_kw,supercap_reject_kw";

/// Exports simulation results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per step using the schema v1
/// column layout. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes simulation results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(HEADER.split(',').map(str::trim))?;

    // Data rows
    for r in results {
        wtr.write_record(&[
            r.timestep.to_string(),
            format!("{:.2}", r.time_s),
            format!("{:.4}", r.demand_kw),
            format!("{:.4}", r.battery_kw),
            format!("{:.4}", r.supercap_kw),
            format!("{:.4}", r.battery_i_a),
            format!("{:.4}", r.battery_v),
            format!("{:.4}", r.battery_soc_pct),
            format!("{:.4}", r.supercap_i_a),
            format!("{:.4}", r.supercap_v),
            format!("{:.4}", r.supercap_soc_pct),
            format!("{:.4}", r.battery_reject_kw),
            format!("{:.4}", r.supercap_reject_kw),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_step(t: usize) -> StepResult {
        StepResult {
            timestep: t,
            time_s: t as f64,
            demand_kw: 1200.0,
            battery_kw: 1000.0,
            supercap_kw: 200.0,
            battery_i_a: 777.5,
            battery_v: 1286.0,
            battery_soc_pct: 49.7,
            supercap_i_a: 370.4,
            supercap_v: 540.0,
            supercap_soc_pct: 99.2,
            battery_reject_kw: 0.0,
            supercap_reject_kw: -3.5,
        }
    }

    #[test]
    fn header_matches_schema_v1() {
        let results = vec![make_step(0)];
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "timestep,time_s,demand_kw,battery_kw,supercap_kw,\
             battery_i_a,battery_v,battery_soc_pct,\
             supercap_i_a,supercap_v,supercap_soc_pct,\
             battery_reject_kw,supercap_reject_kw"
        );
    }

    #[test]
    fn row_count_matches_step_count() {
        let results: Vec<StepResult> = (0..24).map(make_step).collect();
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + 24 data rows
        assert_eq!(lines.len(), 25);
    }

    #[test]
    fn deterministic_output() {
        let results: Vec<StepResult> = (0..5).map(make_step).collect();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&results, &mut buf1).ok();
        write_csv(&results, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn round_trip_parseable() {
        let results: Vec<StepResult> = (0..3).map(make_step).collect();
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(13));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let rec = rec.as_ref();
            // Numeric columns parse as f64
            for i in 1..13 {
                let val: Result<f64, _> = rec.unwrap()[i].parse();
                assert!(val.is_ok(), "column {i} should parse as f64");
            }
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }
}
