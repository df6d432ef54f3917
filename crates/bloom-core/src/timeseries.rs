//! Hourly forcing series.
//!
//! Environmental forcing (mixed-layer depth, sea-surface temperature, surface
//! irradiance, wind speed, salinity) reaches the simulation core as read-only
//! arrays with one sample per hour of a model year. Loading and parsing those
//! arrays is a collaborator's responsibility; this module only defines the
//! validated container the core consumes.

use crate::errors::{BloomError, BloomResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Floating point value used internally
pub type FloatValue = f64;

/// Simulation time, in hours since the start of the current year
pub type Time = FloatValue;

/// Number of hourly samples in one model year.
pub const HOURS_PER_YEAR: usize = 8760;

/// A read-only series of one value per hour of a model year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForcing {
    values: Array1<FloatValue>,
}

impl HourlyForcing {
    /// Wrap an owned array of exactly [`HOURS_PER_YEAR`] samples.
    pub fn from_values(name: &str, values: Array1<FloatValue>) -> BloomResult<Self> {
        if values.len() != HOURS_PER_YEAR {
            return Err(BloomError::ForcingLength {
                name: name.to_string(),
                expected: HOURS_PER_YEAR,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    /// A series holding the same value at every hour.
    pub fn constant(value: FloatValue) -> Self {
        Self {
            values: Array1::from_elem(HOURS_PER_YEAR, value),
        }
    }

    /// Fill the series by evaluating `f` at every hour of the year.
    pub fn from_fn(f: impl Fn(usize) -> FloatValue) -> Self {
        Self {
            values: Array1::from_shape_fn(HOURS_PER_YEAR, f),
        }
    }

    /// Value at the given hour of the year.
    ///
    /// Panics if `hour >= HOURS_PER_YEAR`; the driver only indexes within the
    /// year, so an out-of-range access is a programming error.
    pub fn at(&self, hour: usize) -> FloatValue {
        self.values[hour]
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    /// Forward finite-difference rate of change per hour.
    ///
    /// `delta[h] = v[h+1] - v[h]`; the final slot is 0 rather than reading
    /// past the end of the series.
    pub fn rate_of_change(&self) -> HourlyForcing {
        let mut delta = Array1::zeros(HOURS_PER_YEAR);
        for h in 0..HOURS_PER_YEAR - 1 {
            delta[h] = self.values[h + 1] - self.values[h];
        }
        HourlyForcing { values: delta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_wrong_length() {
        let err = HourlyForcing::from_values("mld", Array1::zeros(100)).unwrap_err();
        assert!(matches!(
            err,
            BloomError::ForcingLength {
                expected: HOURS_PER_YEAR,
                actual: 100,
                ..
            }
        ));
    }

    #[test]
    fn constant_series() {
        let series = HourlyForcing::constant(20.0);
        assert_eq!(series.at(0), 20.0);
        assert_eq!(series.at(HOURS_PER_YEAR - 1), 20.0);
    }

    #[test]
    fn rate_of_change_of_linear_ramp_is_constant() {
        let series = HourlyForcing::from_fn(|h| 2.0 * h as FloatValue);
        let delta = series.rate_of_change();
        assert_relative_eq!(delta.at(0), 2.0);
        assert_relative_eq!(delta.at(HOURS_PER_YEAR - 2), 2.0);
        // Last slot is defined as zero
        assert_eq!(delta.at(HOURS_PER_YEAR - 1), 0.0);
    }

    #[test]
    fn serde_roundtrip() {
        let series = HourlyForcing::from_fn(|h| (h % 24) as FloatValue);
        let json = serde_json::to_string(&series).unwrap();
        let parsed: HourlyForcing = serde_json::from_str(&json).unwrap();
        assert_eq!(series, parsed);
    }
}
