//! State vector layout and the non-negativity correction.

use bloom_core::timeseries::FloatValue;
use nalgebra::SVector;

/// Number of coupled pools.
pub const N_POOLS: usize = 14;

/// The full model state. Units are mmol N m^-3 for the biological pools,
/// mmol Si m^-3 for silicate, mmol calcite-C m^-3 for the coccolith pools,
/// umol C kg^-1 for DIC and uEq kg^-1 for alkalinity.
pub type StateVector = SVector<FloatValue, N_POOLS>;

/// Index constants for [`StateVector`] components.
pub mod pools {
    pub const DIATOMS: usize = 0;
    pub const FLAGELLATES: usize = 1;
    pub const NITRATE: usize = 2;
    pub const SILICATE: usize = 3;
    pub const MESOZOOPLANKTON: usize = 4;
    pub const DETRITUS: usize = 5;
    pub const MICROZOOPLANKTON: usize = 6;
    pub const DINOFLAGELLATES: usize = 7;
    pub const EHUXLEYI: usize = 8;
    pub const AMMONIUM: usize = 9;
    pub const ATTACHED_COCCOLITHS: usize = 10;
    pub const FREE_COCCOLITHS: usize = 11;
    pub const DIC: usize = 12;
    pub const ALKALINITY: usize = 13;
}

/// Winter starting conditions for the standard hindcast.
///
/// Nutrients are at their deep-water values, phytoplankton and zooplankton
/// at seed concentrations, and the attached coccolith pool carries roughly
/// thirty liths per seeded E. huxleyi cell.
pub fn initial_conditions() -> StateVector {
    StateVector::from_column_slice(&[
        0.01,   // diatoms
        0.01,   // flagellates
        20.0,   // nitrate
        35.0,   // silicate
        0.01,   // mesozooplankton
        0.05,   // detritus
        0.01,   // microzooplankton
        0.01,   // dinoflagellates
        0.01,   // E. huxleyi
        0.0001, // ammonium
        0.3,    // attached coccoliths
        0.0001, // free coccoliths
        2100.0, // DIC
        2250.0, // alkalinity
    ])
}

/// Fold any negative component back to its absolute value.
///
/// The integrator can overshoot into small negative concentrations; the
/// model treats those as reflections rather than truncating to zero, which
/// keeps the trajectory off the axes. Returns how many components were
/// corrected so the caller can account for the interventions.
pub fn clamp_non_negative(y: &mut StateVector) -> usize {
    let mut corrected = 0;
    for value in y.iter_mut() {
        if *value < 0.0 {
            *value = value.abs();
            corrected += 1;
        }
    }
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_conditions_are_non_negative() {
        let y = initial_conditions();
        assert!(y.iter().all(|v| *v >= 0.0));
        assert_eq!(y[pools::NITRATE], 20.0);
        assert_eq!(y[pools::ALKALINITY], 2250.0);
    }

    #[test]
    fn clamp_reflects_negative_components_and_counts_them() {
        let mut y = initial_conditions();
        y[pools::DIATOMS] = -0.25;
        y[pools::AMMONIUM] = -1.0e-9;
        let corrected = clamp_non_negative(&mut y);
        assert_eq!(corrected, 2);
        assert_eq!(y[pools::DIATOMS], 0.25);
        assert_eq!(y[pools::AMMONIUM], 1.0e-9);
    }

    #[test]
    fn clamp_leaves_valid_state_untouched() {
        let mut y = initial_conditions();
        let before = y;
        assert_eq!(clamp_non_negative(&mut y), 0);
        assert_eq!(y, before);
    }
}
