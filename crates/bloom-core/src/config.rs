//! Run configuration, deserialised from TOML.

use crate::errors::{BloomError, BloomResult};
use crate::timeseries::HOURS_PER_YEAR;
use serde::{Deserialize, Serialize};

/// Top-level knobs for a multi-year simulation.
///
/// All fields have defaults matching the standard ten-year transient
/// hindcast, so an empty TOML document is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Index of the final simulated year. Years run 0..=`final_year`.
    pub final_year: usize,
    /// Years to skip before emitting attractor snapshots.
    pub ignore_years: usize,
    /// Hour-of-year at which the attractor snapshot is taken.
    pub snapshot_hour: usize,
    /// First year for which detailed daily diagnostics are written.
    pub detail_start_year: usize,
    /// Interannually varying forcing when true; repeat the climatological
    /// year (with the final forcing year last) when false.
    pub transient: bool,
    /// Iterate the carbonate system to tolerance instead of running its
    /// full fixed iteration count every solve.
    pub strict_carbonate_convergence: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            final_year: 9,
            ignore_years: 0,
            snapshot_hour: 4320,
            detail_start_year: 3,
            transient: true,
            strict_carbonate_convergence: false,
        }
    }
}

impl RunConfig {
    /// First year in which the late-regime ecosystem is active. The standard
    /// hindcast anchors the regime change six years before the final year.
    pub fn regime_switch_year(&self) -> usize {
        self.final_year.saturating_sub(6)
    }

    pub fn from_toml(source: &str) -> BloomResult<Self> {
        let config: RunConfig = toml::from_str(source)
            .map_err(|e| BloomError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BloomResult<()> {
        if self.snapshot_hour >= HOURS_PER_YEAR {
            return Err(BloomError::InvalidConfig(format!(
                "snapshot_hour {} must be below {}",
                self.snapshot_hour, HOURS_PER_YEAR
            )));
        }
        if self.ignore_years > self.final_year {
            return Err(BloomError::InvalidConfig(format!(
                "ignore_years {} exceeds final_year {}",
                self.ignore_years, self.final_year
            )));
        }
        Ok(())
    }
}
