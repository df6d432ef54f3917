//! Year-long hourly forcing series and their selection across a run.

use crate::solar::{self, Site};
use bloom_core::config::RunConfig;
use bloom_core::timeseries::{FloatValue, HourlyForcing};

/// One year of physical forcing at hourly resolution.
#[derive(Debug, Clone)]
pub struct ForcingSet {
    /// Mixed layer depth (m)
    pub mixed_layer_depth: HourlyForcing,
    /// Hourly rate of change of the mixed layer depth (m h^-1)
    pub mld_rate: HourlyForcing,
    /// Sea surface temperature (degrees C)
    pub temperature: HourlyForcing,
    /// Surface photosynthetically active radiation (W m^-2)
    pub irradiance: HourlyForcing,
    /// Wind speed at 10 m (m s^-1)
    pub wind_speed: HourlyForcing,
}

impl ForcingSet {
    /// The depth tendency is derived here once, so every consumer sees the
    /// same signed entrainment signal.
    pub fn new(
        mixed_layer_depth: HourlyForcing,
        temperature: HourlyForcing,
        irradiance: HourlyForcing,
        wind_speed: HourlyForcing,
    ) -> Self {
        let mld_rate = mixed_layer_depth.rate_of_change();
        Self {
            mixed_layer_depth,
            mld_rate,
            temperature,
            irradiance,
            wind_speed,
        }
    }

    pub fn constant(
        mixed_layer_depth: FloatValue,
        temperature: FloatValue,
        irradiance: FloatValue,
        wind_speed: FloatValue,
    ) -> Self {
        Self::new(
            HourlyForcing::constant(mixed_layer_depth),
            HourlyForcing::constant(temperature),
            HourlyForcing::constant(irradiance),
            HourlyForcing::constant(wind_speed),
        )
    }
}

/// The full forcing inventory of a run: one climatological year reused
/// throughout the spin-up, and a sequence of observed bloom-era years.
#[derive(Debug, Clone)]
pub struct ForcingLibrary {
    pub climatology: ForcingSet,
    pub bloom_years: Vec<ForcingSet>,
    /// Salinity (psu)
    pub salinity: HourlyForcing,
}

impl ForcingLibrary {
    /// A library where every year sees the same constant conditions.
    pub fn constant(
        mixed_layer_depth: FloatValue,
        temperature: FloatValue,
        irradiance: FloatValue,
        wind_speed: FloatValue,
        salinity: FloatValue,
    ) -> Self {
        let set = ForcingSet::constant(mixed_layer_depth, temperature, irradiance, wind_speed);
        Self {
            climatology: set.clone(),
            bloom_years: vec![set],
            salinity: HourlyForcing::constant(salinity),
        }
    }

    /// Constant physics under an astronomically derived clear-sky PAR cycle.
    pub fn with_clear_sky_irradiance(
        site: Site,
        mixed_layer_depth: FloatValue,
        temperature: FloatValue,
        wind_speed: FloatValue,
        salinity: FloatValue,
    ) -> Self {
        let irradiance =
            HourlyForcing::from_fn(|hour| solar::clear_sky_irradiance(site, hour as FloatValue));
        let set = ForcingSet::new(
            HourlyForcing::constant(mixed_layer_depth),
            HourlyForcing::constant(temperature),
            irradiance,
            HourlyForcing::constant(wind_speed),
        );
        Self {
            climatology: set.clone(),
            bloom_years: vec![set],
            salinity: HourlyForcing::constant(salinity),
        }
    }

    /// The forcing set for a given simulation year.
    ///
    /// Transient runs play the observed years in order once the regime
    /// switches, holding the last one when the run outlives the record.
    /// Steady-state runs repeat the climatology and finish on a single
    /// observed year so the final cycle is comparable across runs. A
    /// library with no observed years falls back to the climatology
    /// throughout.
    pub fn select(&self, config: &RunConfig, year: usize) -> &ForcingSet {
        if self.bloom_years.is_empty() {
            return &self.climatology;
        }
        let switch = config.regime_switch_year();
        if config.transient {
            if year < switch {
                &self.climatology
            } else {
                let index = (year - switch).min(self.bloom_years.len() - 1);
                &self.bloom_years[index]
            }
        } else if year < config.final_year {
            &self.climatology
        } else {
            let index = 1usize.min(self.bloom_years.len() - 1);
            &self.bloom_years[index]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bloom_core::timeseries::HOURS_PER_YEAR;

    #[test]
    fn depth_tendency_is_the_forward_difference() {
        let mld = HourlyForcing::from_fn(|hour| 20.0 + (hour as FloatValue) * 1e-3);
        let set = ForcingSet::new(
            mld,
            HourlyForcing::constant(5.0),
            HourlyForcing::constant(100.0),
            HourlyForcing::constant(5.0),
        );
        assert_relative_eq!(set.mld_rate.at(0), 1e-3, max_relative = 1e-9);
        assert_eq!(set.mld_rate.at(HOURS_PER_YEAR - 1), 0.0);
    }

    #[test]
    fn transient_runs_switch_from_climatology_to_observed_years() {
        let mut library = ForcingLibrary::constant(20.0, 5.0, 100.0, 5.0, 35.0);
        library.bloom_years = vec![
            ForcingSet::constant(25.0, 5.0, 100.0, 5.0),
            ForcingSet::constant(30.0, 5.0, 100.0, 5.0),
        ];
        let config = RunConfig::default(); // final_year 9, switch at 3, transient

        assert_eq!(
            library.select(&config, 0).mixed_layer_depth.at(0),
            20.0,
            "spin-up years use the climatology"
        );
        assert_eq!(library.select(&config, 3).mixed_layer_depth.at(0), 25.0);
        assert_eq!(library.select(&config, 4).mixed_layer_depth.at(0), 30.0);
        assert_eq!(
            library.select(&config, 9).mixed_layer_depth.at(0),
            30.0,
            "years past the record hold the last observed year"
        );
    }

    #[test]
    fn a_library_without_observed_years_always_serves_the_climatology() {
        let mut library = ForcingLibrary::constant(20.0, 5.0, 100.0, 5.0, 35.0);
        library.bloom_years.clear();
        let mut config = RunConfig::default();
        for year in [0, 3, 9] {
            assert_eq!(
                library.select(&config, year).mixed_layer_depth.at(0),
                20.0
            );
        }
        config.transient = false;
        assert_eq!(library.select(&config, 9).mixed_layer_depth.at(0), 20.0);
    }

    #[test]
    fn steady_state_runs_end_on_a_single_observed_year() {
        let mut library = ForcingLibrary::constant(20.0, 5.0, 100.0, 5.0, 35.0);
        library.bloom_years = vec![
            ForcingSet::constant(25.0, 5.0, 100.0, 5.0),
            ForcingSet::constant(30.0, 5.0, 100.0, 5.0),
        ];
        let mut config = RunConfig::default();
        config.transient = false;

        assert_eq!(library.select(&config, 5).mixed_layer_depth.at(0), 20.0);
        assert_eq!(library.select(&config, 9).mixed_layer_depth.at(0), 30.0);
    }
}
