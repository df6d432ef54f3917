//! Multi-year simulation driver.
//!
//! [`Simulation`] owns the configuration, parameters and forcing for a run
//! and advances the fourteen-pool state hour by hour with the classical
//! Runge-Kutta step, re-deriving light, chemistry and air-sea exchange at
//! the top of every hour. Output goes through the [`OutputSink`] trait so
//! callers decide what to keep.

use crate::carbonate::{self, ConvergenceMode};
use crate::ecosystem::{EcosystemRhs, StepDiagnostics, StepEnvironment, YearRegime};
use crate::forcing::ForcingLibrary;
use crate::light;
use crate::parameters::{EcosystemParameters, YearTable};
use crate::state::{clamp_non_negative, initial_conditions, pools, StateVector};
use bloom_core::config::RunConfig;
use bloom_core::errors::BloomResult;
use bloom_core::ivp::{rk4_step, DerivativeEvaluator};
use bloom_core::timeseries::{FloatValue, Time, HOURS_PER_YEAR};

/// One daily output record, taken every 24th step.
///
/// The carbonate quantities are from the solve at the top of the hour, the
/// state is from after the step.
#[derive(Debug, Clone)]
pub struct DailyRecord {
    pub year: usize,
    /// Day of year, 1-based
    pub day: usize,
    pub state: StateVector,
    /// Chlorophyll implied by the phytoplankton pools (mg chl m^-3)
    pub chlorophyll: FloatValue,
    pub total_phytoplankton: FloatValue,
    pub total_zooplankton: FloatValue,
    /// Total phytoplankton in carbon units (mg C m^-3)
    pub phytoplankton_carbon: FloatValue,
    /// Total zooplankton in carbon units (mg C m^-3)
    pub zooplankton_carbon: FloatValue,
    /// Irradiance at the 5 m reference depth (W m^-2)
    pub irradiance_at_depth: FloatValue,
    /// pCO2 of the water (uatm)
    pub pco2: FloatValue,
    /// Carbonate ion (umol kg^-1)
    pub carbonate_ion: FloatValue,
    /// Bicarbonate ion (umol kg^-1)
    pub bicarbonate: FloatValue,
    /// Dissolved CO2 (umol kg^-1)
    pub co2_aq: FloatValue,
    pub omega_calcite: FloatValue,
    pub omega_aragonite: FloatValue,
    pub ph: FloatValue,
    /// Flux diagnostics, present once the detail years begin
    pub diagnostics: Option<StepDiagnostics>,
}

/// A fixed-hour sample of the seasonal attractor, one per year.
#[derive(Debug, Clone, Copy)]
pub struct AttractorSnapshot {
    pub year: usize,
    pub hour: usize,
    /// Diatoms plus flagellates (mmol N m^-3)
    pub siliceous_phytoplankton: FloatValue,
    pub mesozooplankton: FloatValue,
}

/// Receives simulation output as it is produced.
pub trait OutputSink {
    fn year_start(&mut self, _year: usize) {}
    fn daily(&mut self, _record: &DailyRecord) {}
    fn snapshot(&mut self, _snapshot: &AttractorSnapshot) {}
    fn year_end(&mut self, _year: usize, _state: &StateVector) {}
}

/// Discards all output.
pub struct NullSink;

impl OutputSink for NullSink {}

/// Collects every record in memory.
#[derive(Default)]
pub struct MemorySink {
    pub daily: Vec<DailyRecord>,
    pub snapshots: Vec<AttractorSnapshot>,
    pub year_end_states: Vec<(usize, StateVector)>,
}

impl OutputSink for MemorySink {
    fn daily(&mut self, record: &DailyRecord) {
        self.daily.push(record.clone());
    }

    fn snapshot(&mut self, snapshot: &AttractorSnapshot) {
        self.snapshots.push(*snapshot);
    }

    fn year_end(&mut self, year: usize, state: &StateVector) {
        self.year_end_states.push((year, *state));
    }
}

/// Counters accumulated over a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub steps: u64,
    /// State components reflected back to positive after a step
    pub clamped_components: u64,
    /// Carbonate solves that left the iteration budget unconverged
    pub carbonate_unconverged: u64,
    pub final_state: StateVector,
}

pub struct Simulation {
    pub config: RunConfig,
    pub params: EcosystemParameters,
    pub years: YearTable,
    pub forcing: ForcingLibrary,
}

impl Simulation {
    pub fn new(config: RunConfig, forcing: ForcingLibrary) -> Self {
        Self {
            config,
            params: EcosystemParameters::default(),
            years: YearTable::default(),
            forcing,
        }
    }

    /// Run all years from the standard initial conditions.
    pub fn run(&self, sink: &mut impl OutputSink) -> BloomResult<RunSummary> {
        self.run_from(initial_conditions(), sink)
    }

    /// Run all years from a given state, carrying it across year boundaries.
    pub fn run_from(
        &self,
        mut y: StateVector,
        sink: &mut impl OutputSink,
    ) -> BloomResult<RunSummary> {
        let mut steps = 0u64;
        let mut clamped = 0u64;
        let mut unconverged = 0u64;

        for year in 0..=self.config.final_year {
            sink.year_start(year);
            let regime = if year < self.config.regime_switch_year() {
                YearRegime::CoccolithsDormant
            } else {
                YearRegime::CoccolithsActive
            };
            log::info!(
                "year {year}: regime {:?}, {} forcing",
                regime,
                if self.config.transient {
                    "transient"
                } else {
                    "repeating"
                }
            );
            let (y_next, year_steps, year_clamped, year_unconverged) =
                self.run_year(year, regime, y, sink)?;
            if year_clamped > 0 {
                log::warn!("year {year}: reflected {year_clamped} negative state components");
            }
            if year_unconverged > 0 {
                log::warn!("year {year}: {year_unconverged} carbonate solves hit the iteration budget");
            }
            y = y_next;
            steps += year_steps;
            clamped += year_clamped;
            unconverged += year_unconverged;
            sink.year_end(year, &y);
        }

        Ok(RunSummary {
            steps,
            clamped_components: clamped,
            carbonate_unconverged: unconverged,
            final_state: y,
        })
    }

    fn run_year(
        &self,
        year: usize,
        regime: YearRegime,
        mut y: StateVector,
        sink: &mut impl OutputSink,
    ) -> BloomResult<(StateVector, u64, u64, u64)> {
        let p = &self.params;
        let set = self.forcing.select(&self.config, year);
        let settings = self.years.settings(year);
        let mode = if self.config.strict_carbonate_convergence {
            ConvergenceMode::Tolerance
        } else {
            ConvergenceMode::FixedCount
        };

        let mut steps = 0u64;
        let mut clamped = 0u64;
        let mut unconverged = 0u64;
        let mut t: Time = 1.0;
        let h: FloatValue = 1.0;

        // the last hours of the series feed the one-hour lookahead below
        for k in 1..=HOURS_PER_YEAR - 3 {
            // depth and light lead the scalar forcing by one hour, so the
            // entrainment signal matches the depth the step will end at
            let mixed = set.mixed_layer_depth.at(k);
            let mld_rate = set.mld_rate.at(k);
            let irradiance = set.irradiance.at(k);
            let temperature = set.temperature.at(k - 1);
            let wind = set.wind_speed.at(k - 1);
            let salinity = self.forcing.salinity.at(k - 1);

            let chl = p.n_to_c_mass
                * p.chl_to_c
                * (y[pools::DIATOMS]
                    + y[pools::FLAGELLATES]
                    + y[pools::DINOFLAGELLATES]
                    + y[pools::EHUXLEYI]);

            let chem = carbonate::solve(
                salinity,
                temperature,
                y[pools::ALKALINITY],
                y[pools::DIC],
                y[pools::SILICATE],
                mode,
            );
            if !chem.converged {
                unconverged += 1;
            }

            let env = StepEnvironment {
                mixed_layer_depth: mixed,
                mld_rate,
                mixing_rate: settings.mixing_rate,
                light_all: light::steele_average(irradiance, chl, mixed, p.i_sat),
                light_ehuxleyi: light::steele_average(irradiance, chl, mixed, p.i_sat_ehuxleyi),
                light_calcification: light::monod_average(
                    irradiance,
                    chl,
                    mixed,
                    p.i_half_calcification,
                ),
                temperature_factor: (p.q10_slope * temperature).exp(),
                gas_transfer: carbonate::gas_transfer_velocity(wind, temperature),
                co2_solubility: carbonate::co2_solubility(salinity, temperature),
                pco2_water: chem.pco2,
                omega_calcite: chem.omega_calcite,
                deep_nitrate: settings.deep_nitrate,
                deep_silicate: settings.deep_silicate,
            };

            let rhs = EcosystemRhs::new(p, &env, regime);
            let daily = k % 24 == 0;
            let diagnostics = (daily && year >= self.config.detail_start_year)
                .then(|| rhs.diagnostics(&y));

            let mut dy = StateVector::zeros();
            rhs.dy_dt(t, &y, &mut dy);
            y = rk4_step(&rhs, &y, &dy, t, h)?;
            t += h;
            clamped += clamp_non_negative(&mut y) as u64;
            steps += 1;

            if daily {
                let phyto = y[pools::DIATOMS]
                    + y[pools::FLAGELLATES]
                    + y[pools::DINOFLAGELLATES]
                    + y[pools::EHUXLEYI];
                let zoo = y[pools::MICROZOOPLANKTON] + y[pools::MESOZOOPLANKTON];
                sink.daily(&DailyRecord {
                    year,
                    day: k / 24,
                    state: y,
                    chlorophyll: chl,
                    total_phytoplankton: phyto,
                    total_zooplankton: zoo,
                    phytoplankton_carbon: p.n_to_c_mass * phyto,
                    zooplankton_carbon: p.n_to_c_mass_zoo * zoo,
                    irradiance_at_depth: light::light_at_depth(irradiance, chl),
                    pco2: chem.pco2 * 1.0e6,
                    carbonate_ion: chem.carbonate,
                    bicarbonate: chem.bicarbonate,
                    co2_aq: chem.co2_aq,
                    omega_calcite: chem.omega_calcite,
                    omega_aragonite: chem.omega_aragonite,
                    ph: chem.ph,
                    diagnostics,
                });
            }
            if year > self.config.ignore_years && k == self.config.snapshot_hour {
                sink.snapshot(&AttractorSnapshot {
                    year,
                    hour: k,
                    siliceous_phytoplankton: y[pools::DIATOMS] + y[pools::FLAGELLATES],
                    mesozooplankton: y[pools::MESOZOOPLANKTON],
                });
            }
        }

        Ok((y, steps, clamped, unconverged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_year_config() -> RunConfig {
        RunConfig {
            final_year: 0,
            detail_start_year: 0,
            ..RunConfig::default()
        }
    }

    #[test]
    fn one_year_takes_the_expected_number_of_steps() {
        let config = one_year_config();
        let forcing = ForcingLibrary::constant(20.0, 5.0, 100.0, 5.0, 35.0);
        let simulation = Simulation::new(config, forcing);
        let summary = simulation.run(&mut NullSink).unwrap();
        assert_eq!(summary.steps, (HOURS_PER_YEAR - 3) as u64);
    }

    #[test]
    fn daily_records_carry_detail_from_the_configured_year() {
        let config = one_year_config();
        let forcing = ForcingLibrary::constant(20.0, 5.0, 100.0, 5.0, 35.0);
        let simulation = Simulation::new(config, forcing);
        let mut sink = MemorySink::default();
        simulation.run(&mut sink).unwrap();

        assert_eq!(sink.daily.len(), (HOURS_PER_YEAR - 3) / 24);
        assert!(sink.daily.iter().all(|r| r.diagnostics.is_some()));
        assert_eq!(sink.daily[0].day, 1);
        // year 0 is never past ignore_years, so no attractor sample yet
        assert!(sink.snapshots.is_empty());
        assert_eq!(sink.year_end_states.len(), 1);
    }

    #[test]
    fn snapshots_begin_after_the_ignored_years() {
        let config = RunConfig {
            final_year: 1,
            detail_start_year: 2,
            ..RunConfig::default()
        };
        let forcing = ForcingLibrary::constant(20.0, 5.0, 100.0, 5.0, 35.0);
        let simulation = Simulation::new(config, forcing);
        let mut sink = MemorySink::default();
        simulation.run(&mut sink).unwrap();

        assert_eq!(sink.snapshots.len(), 1);
        assert_eq!(sink.snapshots[0].year, 1);
        assert_eq!(sink.snapshots[0].hour, 4320);
        assert!(sink.daily.iter().all(|r| r.diagnostics.is_none()));
    }
}
