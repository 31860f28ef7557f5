//! # Distance Estimation
//!
//! Estimates peer distance from received signal strength using the
//! log-distance path-loss model:
//!
//! ```text
//! d = 10 ^ ((A - RSSI) / (10 * n))
//! ```
//!
//! where `A` is the RSSI measured at one meter and `n` the path-loss exponent
//! (2.0 for free space).

/// RSSI at the one meter reference distance (dBm)
pub const REFERENCE_DBM: f32 = -40.0;

/// Free-space path-loss exponent
pub const PATH_LOSS_EXPONENT: f32 = 2.0;

/// Weakest RSSI the radio reports (dBm)
pub const RSSI_MIN_DBM: i32 = -127;

/// Strongest plausible RSSI (dBm)
pub const RSSI_MAX_DBM: i32 = 0;

/// Calibrated log-distance path-loss model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLossModel {
    reference_dbm: f32,
    path_loss_exponent: f32,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            reference_dbm: REFERENCE_DBM,
            path_loss_exponent: PATH_LOSS_EXPONENT,
        }
    }
}

impl PathLossModel {
    /// Create a model with custom calibration constants.
    ///
    /// `path_loss_exponent` must be positive; config validation enforces this.
    #[must_use]
    pub fn new(reference_dbm: f32, path_loss_exponent: f32) -> Self {
        Self {
            reference_dbm,
            path_loss_exponent,
        }
    }

    /// Estimate distance in meters for an RSSI reading.
    ///
    /// # Examples
    ///
    /// ```
    /// use biospider_panel::ranging::PathLossModel;
    ///
    /// let model = PathLossModel::default();
    /// assert_eq!(model.estimate(-40), 1.0);
    /// assert!((model.estimate(-60) - 10.0).abs() < 1e-4);
    /// ```
    pub fn estimate(&self, rssi_dbm: i32) -> f32 {
        // Weaker signal means farther away
        let exponent = (self.reference_dbm - rssi_dbm as f32) / (10.0 * self.path_loss_exponent);
        10.0f32.powf(exponent)
    }
}

/// Estimate distance with the default calibration (-40 dBm at 1 m, n = 2.0)
pub fn estimate(rssi_dbm: i32) -> f32 {
    PathLossModel::default().estimate(rssi_dbm)
}

/// Whether an RSSI reading is inside the range the radio can report
pub fn is_plausible(rssi_dbm: i32) -> bool {
    (RSSI_MIN_DBM..=RSSI_MAX_DBM).contains(&rssi_dbm)
}
