//! Hybrid energy-storage system simulator: a battery bank and a
//! supercapacitor bank serving a duty-cycle power trace under a
//! threshold power-split policy, with trace-driven bank sizing.

pub mod banks;
pub mod config;
pub mod error;
pub mod io;
pub mod profile;
/// Simulation engine, supervisory controller, and run summary modules.
pub mod sim;
pub mod sizing;
