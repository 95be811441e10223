//! File I/O: CSV telemetry export and demand-profile loading.

pub mod export;
pub mod profile;
