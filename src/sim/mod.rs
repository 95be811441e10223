/// Threshold power-split supervisory controller.
pub mod controller;
pub mod engine;
/// Post-hoc run summary computation.
pub mod kpi;
pub mod types;
