//! Biological and chemical constants of the ecosystem model.
//!
//! All rate parameters are stored per hour; the published literature values
//! are per day and are divided by 24 in [`EcosystemParameters::default`].

use bloom_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Holling type III feeding preferences of microzooplankton.
///
/// Two tables exist because the grazer community shifts with silicate:
/// below 3 mmol Si m^-3 diatoms become palatable to microzooplankton.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GrazingPreferences {
    pub flagellates: FloatValue,
    pub ehuxleyi: FloatValue,
    pub diatoms: FloatValue,
}

impl GrazingPreferences {
    /// Preferences when silicate is below 3 mmol Si m^-3.
    pub fn low_silicate() -> Self {
        Self {
            flagellates: 0.5,
            ehuxleyi: 0.33,
            diatoms: 0.5,
        }
    }

    /// Preferences when silicate is plentiful.
    pub fn high_silicate() -> Self {
        Self {
            flagellates: 0.5,
            ehuxleyi: 0.33,
            diatoms: 0.5,
        }
    }
}

/// Every tunable constant of the ecosystem and its carbonate coupling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EcosystemParameters {
    // ----- maximum growth at 0 degC -----
    /// Diatom maximum growth rate (h^-1)
    pub mu_diatoms: FloatValue,
    /// Flagellate maximum growth rate (h^-1)
    pub mu_flagellates: FloatValue,
    /// Dinoflagellate maximum growth rate (h^-1)
    pub mu_dinoflagellates: FloatValue,
    /// E. huxleyi maximum growth rate (h^-1)
    pub mu_ehuxleyi: FloatValue,
    /// Eppley temperature coefficient, growth scales as exp(q10_slope * T)
    pub q10_slope: FloatValue,

    // ----- nutrient half-saturation (mmol m^-3) -----
    /// Nitrate half-saturation, diatoms
    pub k_nitrate_diatoms: FloatValue,
    /// Nitrate half-saturation, flagellates
    pub k_nitrate_flagellates: FloatValue,
    /// Nitrate half-saturation, dinoflagellates
    pub k_nitrate_dinoflagellates: FloatValue,
    /// Nitrate half-saturation, E. huxleyi
    pub k_nitrate_ehuxleyi: FloatValue,
    /// Ammonium half-saturation, diatoms
    pub k_ammonium_diatoms: FloatValue,
    /// Ammonium half-saturation, flagellates
    pub k_ammonium_flagellates: FloatValue,
    /// Ammonium half-saturation, dinoflagellates
    pub k_ammonium_dinoflagellates: FloatValue,
    /// Ammonium half-saturation, E. huxleyi
    pub k_ammonium_ehuxleyi: FloatValue,
    /// Silicate half-saturation, diatoms only
    pub k_silicate: FloatValue,

    // ----- mortality, excretion, remineralisation (h^-1) -----
    /// Diatom specific mortality
    pub mortality_diatoms: FloatValue,
    /// Flagellate specific mortality
    pub mortality_flagellates: FloatValue,
    /// Dinoflagellate specific mortality
    pub mortality_dinoflagellates: FloatValue,
    /// E. huxleyi specific mortality
    pub mortality_ehuxleyi: FloatValue,
    /// Microzooplankton quadratic mortality ((mmol N m^-3)^-1 h^-1)
    pub mortality_microzoo: FloatValue,
    /// Mesozooplankton quadratic mortality ((mmol N m^-3)^-1 h^-1)
    pub mortality_mesozoo: FloatValue,
    /// Microzooplankton excretion
    pub excretion_microzoo: FloatValue,
    /// Mesozooplankton excretion
    pub excretion_mesozoo: FloatValue,
    /// Detritus breakdown to ammonium
    pub detritus_breakdown: FloatValue,
    /// Fraction of dead microzooplankton recycled to ammonium in the layer
    pub recycled_microzoo: FloatValue,
    /// Fraction of dead mesozooplankton recycled to ammonium in the layer
    pub recycled_mesozoo: FloatValue,
    /// Nitrification rate, ammonium to nitrate (h^-1)
    pub nitrification: FloatValue,

    // ----- grazing -----
    /// Microzooplankton maximum ingestion of diatoms (h^-1)
    pub ingestion_micro_diatoms: FloatValue,
    /// Microzooplankton maximum ingestion of flagellates (h^-1)
    pub ingestion_micro_flagellates: FloatValue,
    /// Microzooplankton maximum ingestion of E. huxleyi (h^-1)
    pub ingestion_micro_ehuxleyi: FloatValue,
    /// Mesozooplankton maximum ingestion of diatoms (h^-1)
    pub ingestion_meso_diatoms: FloatValue,
    /// Mesozooplankton maximum ingestion of dinoflagellates (h^-1)
    pub ingestion_meso_dinoflagellates: FloatValue,
    /// Mesozooplankton maximum ingestion of microzooplankton (h^-1)
    pub ingestion_meso_microzoo: FloatValue,
    /// Microzooplankton feeding half-saturation (mmol N m^-3)
    pub k_grazing_micro: FloatValue,
    /// Mesozooplankton feeding half-saturation (mmol N m^-3)
    pub k_grazing_meso: FloatValue,
    /// Microzooplankton preferences when silicate < silicate_switch
    pub preferences_low_silicate: GrazingPreferences,
    /// Microzooplankton preferences otherwise
    pub preferences_high_silicate: GrazingPreferences,
    /// Silicate threshold at which the preference table switches (mmol Si m^-3)
    pub silicate_switch: FloatValue,
    /// Mesozooplankton feeding preference for diatoms
    pub preference_meso_diatoms: FloatValue,
    /// Mesozooplankton feeding preference for dinoflagellates
    pub preference_meso_dinoflagellates: FloatValue,
    /// Mesozooplankton feeding preference for microzooplankton
    pub preference_meso_microzoo: FloatValue,
    /// Mesozooplankton assimilation efficiency for diatoms
    pub assimilation_meso_diatoms: FloatValue,
    /// Mesozooplankton assimilation efficiency for dinoflagellates
    pub assimilation_meso_dinoflagellates: FloatValue,
    /// Mesozooplankton assimilation efficiency for microzooplankton
    pub assimilation_meso_microzoo: FloatValue,
    /// Microzooplankton assimilation efficiency for flagellates
    pub assimilation_micro_flagellates: FloatValue,
    /// Microzooplankton assimilation efficiency for E. huxleyi
    pub assimilation_micro_ehuxleyi: FloatValue,
    /// Microzooplankton assimilation efficiency for diatoms
    pub assimilation_micro_diatoms: FloatValue,

    // ----- sinking (m h^-1) -----
    /// Diatom sinking speed, minimum value
    pub sinking_diatoms: FloatValue,
    /// Sinking speed of the other phytoplankton groups
    pub sinking_other: FloatValue,
    /// Detritus sinking speed; this controls the export production
    pub sinking_detritus: FloatValue,
    /// Silicate level below which diatom sinking accelerates (mmol Si m^-3)
    pub sinking_ramp_threshold: FloatValue,

    // ----- coccoliths -----
    /// Maximum calcification rate (mmol calcite-C (mmol org-C)^-1 h^-1)
    pub calcification_max: FloatValue,
    /// Calcite dissolution rate within the layer (h^-1)
    pub dissolution: FloatValue,
    /// Maximum number of coccoliths attached to a cell
    pub coccoliths_per_cell_max: FloatValue,
    /// Inorganic carbon content of one coccolith (g calcite-C)
    pub carbon_per_coccolith: FloatValue,
    /// Organic carbon content of one E. huxleyi cell (g organic-C)
    pub carbon_per_cell: FloatValue,
    /// Coccolith detachment rate (h^-1)
    pub detachment: FloatValue,
    /// Minimum detachment rate (h^-1)
    pub detachment_min: FloatValue,

    // ----- light -----
    /// Saturating irradiance for all phytoplankton but E. huxleyi (W m^-2)
    pub i_sat: FloatValue,
    /// Saturating irradiance for E. huxleyi (W m^-2)
    pub i_sat_ehuxleyi: FloatValue,
    /// Light half-saturation for calcification (W m^-2)
    pub i_half_calcification: FloatValue,

    // ----- stoichiometry -----
    /// C:N molar ratio of phytoplankton (Redfield 106:16)
    pub c_to_n: FloatValue,
    /// Phytoplankton conversion from mmol N m^-3 to mg C m^-3
    pub n_to_c_mass: FloatValue,
    /// Zooplankton conversion from mmol N m^-3 to mg C m^-3
    pub n_to_c_mass_zoo: FloatValue,
    /// Constant Chl:C mass ratio
    pub chl_to_c: FloatValue,

    // ----- carbonate coupling -----
    /// Atmospheric pCO2 (atm)
    pub pco2_air: FloatValue,
    /// DIC below the mixed layer (umol C kg^-1)
    pub deep_dic: FloatValue,
    /// Alkalinity below the mixed layer (uEq kg^-1)
    pub deep_alkalinity: FloatValue,
}

impl Default for EcosystemParameters {
    fn default() -> Self {
        Self {
            mu_diatoms: 1.2 / 24.0,
            mu_flagellates: 0.65 / 24.0,
            mu_dinoflagellates: 0.6 / 24.0,
            mu_ehuxleyi: 1.15 / 24.0,
            q10_slope: 0.063,

            k_nitrate_diatoms: 1.5,
            k_nitrate_flagellates: 1.5,
            k_nitrate_dinoflagellates: 1.5,
            k_nitrate_ehuxleyi: 1.5,
            k_ammonium_diatoms: 0.05,
            k_ammonium_flagellates: 0.05,
            k_ammonium_dinoflagellates: 0.05,
            k_ammonium_ehuxleyi: 0.05,
            k_silicate: 3.5,

            mortality_diatoms: 0.04 / 24.0,
            mortality_flagellates: 0.04 / 24.0,
            mortality_dinoflagellates: 0.04 / 24.0,
            mortality_ehuxleyi: 0.04 / 24.0,
            mortality_microzoo: 0.05 / 24.0,
            mortality_mesozoo: 0.2 / 24.0,
            excretion_microzoo: 0.025 / 24.0,
            excretion_mesozoo: 0.1 / 24.0,
            detritus_breakdown: 0.1 / 24.0,
            recycled_microzoo: 0.1,
            recycled_mesozoo: 0.1,
            nitrification: 0.05 / 24.0,

            ingestion_micro_diatoms: 0.175 / 24.0,
            ingestion_micro_flagellates: 0.7 / 24.0,
            ingestion_micro_ehuxleyi: 0.175 / 24.0,
            ingestion_meso_diatoms: 0.7 / 24.0,
            ingestion_meso_dinoflagellates: 0.7 / 24.0,
            ingestion_meso_microzoo: 0.7 / 24.0,
            k_grazing_micro: 1.0,
            k_grazing_meso: 1.0,
            preferences_low_silicate: GrazingPreferences::low_silicate(),
            preferences_high_silicate: GrazingPreferences::high_silicate(),
            silicate_switch: 3.0,
            preference_meso_diatoms: 0.33,
            preference_meso_dinoflagellates: 0.33,
            preference_meso_microzoo: 0.33,
            assimilation_meso_diatoms: 0.75,
            assimilation_meso_dinoflagellates: 0.75,
            assimilation_meso_microzoo: 0.75,
            assimilation_micro_flagellates: 0.75,
            assimilation_micro_ehuxleyi: 0.75,
            assimilation_micro_diatoms: 0.75,

            sinking_diatoms: 0.5 / 24.0,
            sinking_other: 0.0001 / 24.0,
            sinking_detritus: 1.0 / 24.0,
            sinking_ramp_threshold: 2.0,

            calcification_max: 0.2 / 24.0,
            dissolution: 0.08 / 24.0,
            coccoliths_per_cell_max: 15.0,
            carbon_per_coccolith: 0.25e-12,
            carbon_per_cell: 10.0e-12,
            detachment: 23.5 / 24.0,
            detachment_min: 0.1 / 24.0,

            i_sat: 100.0,
            i_sat_ehuxleyi: 280.0,
            i_half_calcification: 40.0,

            c_to_n: 6.625,
            n_to_c_mass: 79.5,
            n_to_c_mass_zoo: 67.5,
            chl_to_c: 1.0 / 50.0,

            pco2_air: 358.0e-6,
            deep_dic: 2000.0,
            deep_alkalinity: 2100.0,
        }
    }
}

/// Boundary conditions and mixing that can vary from year to year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct YearSettings {
    /// Cross-thermocline mixing rate (m h^-1)
    pub mixing_rate: FloatValue,
    /// Nitrate below the mixed layer (mmol N m^-3)
    pub deep_nitrate: FloatValue,
    /// Silicate below the mixed layer (mmol Si m^-3)
    pub deep_silicate: FloatValue,
}

impl Default for YearSettings {
    fn default() -> Self {
        Self {
            mixing_rate: 0.01 / 24.0,
            deep_nitrate: 20.0,
            deep_silicate: 35.0,
        }
    }
}

/// Per-year overrides on top of a default [`YearSettings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct YearTable {
    pub default: YearSettings,
    pub overrides: BTreeMap<usize, YearSettings>,
}

impl YearTable {
    pub fn settings(&self, year: usize) -> YearSettings {
        self.overrides.get(&year).copied().unwrap_or(self.default)
    }
}
