//! Supervisory power-split controller.

use crate::error::ModelError;

/// Power allocation for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSplit {
    /// Power routed to the battery bank (kW).
    pub battery_kw: f64,
    /// Power routed to the supercapacitor bank (kW).
    pub supercap_kw: f64,
}

/// Threshold peak-shaving controller.
///
/// The battery carries the steady base load; the supercapacitor, which
/// tolerates far higher instantaneous current and cycling, is reserved for
/// excursions above the threshold. Stateless: each decision depends only
/// on the current demand and the fixed threshold.
#[derive(Debug, Clone, Copy)]
pub struct SupervisoryController {
    threshold_kw: f64,
}

impl SupervisoryController {
    /// Creates a controller with the given split threshold (kW magnitude).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] unless the threshold is a
    /// strictly positive finite number.
    pub fn new(threshold_kw: f64) -> Result<Self, ModelError> {
        if !(threshold_kw.is_finite() && threshold_kw > 0.0) {
            return Err(ModelError::parameter(
                "threshold_kw",
                "must be a positive finite number",
            ));
        }
        Ok(Self { threshold_kw })
    }

    /// Configured threshold (kW).
    pub fn threshold_kw(&self) -> f64 {
        self.threshold_kw
    }

    /// Splits a total demand between the two banks.
    ///
    /// `|total| <= threshold` routes everything to the battery; beyond the
    /// threshold the battery is capped at `±threshold` (sign of the
    /// demand) and the supercapacitor takes the remainder. Pure function:
    /// identical inputs always produce identical outputs.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] for a non-finite demand.
    pub fn split(&self, total_kw: f64) -> Result<PowerSplit, ModelError> {
        if !total_kw.is_finite() {
            return Err(ModelError::input("total_kw", total_kw));
        }

        let th = self.threshold_kw;
        if total_kw.abs() <= th {
            return Ok(PowerSplit {
                battery_kw: total_kw,
                supercap_kw: 0.0,
            });
        }

        let capped = th.copysign(total_kw);
        Ok(PowerSplit {
            battery_kw: capped,
            supercap_kw: total_kw - capped,
        })
    }
}
