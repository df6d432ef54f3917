//! Three-layer optical model of the mixed layer, after Anderson (1993).
//!
//! Attenuation in each of three depth bands (0-5 m, 5-23 m, below 23 m) is a
//! fifth-order polynomial in the square root of chlorophyll. The mixed layer
//! is split into 30 sub-intervals; irradiance is evaluated at the midpoint of
//! each and the photosynthetic response is averaged over them, either as a
//! Steele curve (saturation and photoinhibition) or a Michaelis-Menten curve
//! (calcification).

use bloom_core::timeseries::FloatValue;

/// Number of sub-intervals the mixed layer is split into.
pub const SUB_INTERVALS: usize = 30;

/// Polynomial coefficients for the band attenuation coefficients,
/// row i giving k_i = sum_j B[i][j] * sqrt(chl)^j.
const B: [[FloatValue; 6]; 3] = [
    [0.13096, 0.030969, 0.042644, -0.013738, 0.0024617, -0.00018059],
    [0.041025, 0.036211, 0.062297, -0.030098, 0.0062597, -0.00051944],
    [0.021517, 0.050150, 0.058900, -0.040539, 0.0087586, -0.00049476],
];

/// Attenuation coefficients (m^-1) of the three depth bands.
///
/// The polynomial argument is the square root of the pigment concentration,
/// biasing toward the smaller values that dominate in nature.
pub fn attenuation_coefficients(chlorophyll: FloatValue) -> [FloatValue; 3] {
    let c = chlorophyll.sqrt();
    let mut k = [0.0; 3];
    for (ki, row) in k.iter_mut().zip(B.iter()) {
        for (j, b) in row.iter().enumerate() {
            *ki += b * c.powi(j as i32);
        }
    }
    k
}

/// Midpoint irradiances over the mixed layer when it sits entirely within
/// the first optical band (depth <= 5 m).
pub fn profile_shallow(
    irr_surf: FloatValue,
    chlorophyll: FloatValue,
    depth: FloatValue,
) -> [FloatValue; SUB_INTERVALS] {
    let k = attenuation_coefficients(chlorophyll);
    let mut iz = [0.0; SUB_INTERVALS];
    for (z, out) in iz.iter_mut().enumerate() {
        let zm = z as FloatValue + 0.5;
        *out = irr_surf * (-k[0] * (zm * depth / 30.0)).exp();
    }
    iz
}

/// Midpoint irradiances for a mixed layer reaching into the second band
/// (5 m < depth <= 23 m).
///
/// Sub-intervals below the first band carry the full first-band attenuation
/// as a fixed factor and then attenuate with the layer-2 coefficient scaled
/// by the whole mixed-layer depth, as the model was originally formulated.
pub fn profile_mid(
    irr_surf: FloatValue,
    chlorophyll: FloatValue,
    depth: FloatValue,
) -> [FloatValue; SUB_INTERVALS] {
    let k = attenuation_coefficients(chlorophyll);
    let in_band_1 = ((30.0 / depth) * 5.0) as usize;
    let mut iz = [0.0; SUB_INTERVALS];
    for (z, out) in iz.iter_mut().enumerate() {
        let zm = z as FloatValue + 0.5;
        *out = if z < in_band_1 {
            irr_surf * (-k[0] * (zm * 5.0 / 30.0)).exp()
        } else {
            irr_surf * (-5.0 * k[0]).exp() * (-k[1] * (zm * depth / 30.0)).exp()
        };
    }
    iz
}

/// Midpoint irradiances for a mixed layer deeper than 23 m.
pub fn profile_deep(
    irr_surf: FloatValue,
    chlorophyll: FloatValue,
    depth: FloatValue,
) -> [FloatValue; SUB_INTERVALS] {
    let k = attenuation_coefficients(chlorophyll);
    let in_band_1 = ((30.0 / depth) * 5.0) as usize;
    let in_band_2 = ((30.0 / depth) * 18.0) as usize;
    let mut iz = [0.0; SUB_INTERVALS];
    for (z, out) in iz.iter_mut().enumerate() {
        let zm = z as FloatValue + 0.5;
        *out = if z < in_band_1 {
            irr_surf * (-k[0] * (zm * 5.0 / 30.0)).exp()
        } else if z < in_band_2 {
            irr_surf * (-5.0 * k[0]).exp() * (-k[1] * (zm * 23.0 / 30.0)).exp()
        } else {
            irr_surf
                * (-5.0 * k[0]).exp()
                * (-18.0 * k[1]).exp()
                * (-k[2] * (zm * depth / 30.0)).exp()
        };
    }
    iz
}

/// Midpoint irradiance profile for any mixed-layer depth.
///
/// Non-positive depths fall into the shallow branch, where the depth factor
/// collapses the whole profile to the surface irradiance.
pub fn profile(
    irr_surf: FloatValue,
    chlorophyll: FloatValue,
    depth: FloatValue,
) -> [FloatValue; SUB_INTERVALS] {
    if depth <= 5.0 {
        profile_shallow(irr_surf, chlorophyll, depth)
    } else if depth <= 23.0 {
        profile_mid(irr_surf, chlorophyll, depth)
    } else {
        profile_deep(irr_surf, chlorophyll, depth)
    }
}

/// Depth-averaged Steele light limitation, `(I/I_sat) exp(1 - I/I_sat)`.
///
/// Saturates at `i_sat` and is photoinhibited above it.
pub fn steele_average(
    irr_surf: FloatValue,
    chlorophyll: FloatValue,
    depth: FloatValue,
    i_sat: FloatValue,
) -> FloatValue {
    let sum: FloatValue = profile(irr_surf, chlorophyll, depth)
        .iter()
        .map(|iz| (iz / i_sat) * (1.0 - iz / i_sat).exp())
        .sum();
    sum / SUB_INTERVALS as FloatValue
}

/// Depth-averaged Michaelis-Menten light limitation, `I / (I + I_h)`.
pub fn monod_average(
    irr_surf: FloatValue,
    chlorophyll: FloatValue,
    depth: FloatValue,
    i_half: FloatValue,
) -> FloatValue {
    let sum: FloatValue = profile(irr_surf, chlorophyll, depth)
        .iter()
        .map(|iz| iz / (iz + i_half))
        .sum();
    sum / SUB_INTERVALS as FloatValue
}

/// Raw irradiance at 5 m, the bottom of the first optical band. Diagnostic.
pub fn light_at_depth(irr_surf: FloatValue, chlorophyll: FloatValue) -> FloatValue {
    let k = attenuation_coefficients(chlorophyll);
    irr_surf * (-k[0] * 5.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn attenuation_grows_with_pigment() {
        let clear = attenuation_coefficients(0.1);
        let turbid = attenuation_coefficients(4.0);
        for band in 0..3 {
            assert!(turbid[band] > clear[band]);
        }
    }

    #[test]
    fn shallow_and_mid_branches_agree_at_five_metres() {
        // At exactly 5 m the mid-branch band boundary lands on interval 30,
        // so its first-band formula covers the whole profile and reduces to
        // the shallow branch.
        let a = profile_shallow(120.0, 1.0, 5.0);
        let b = profile_mid(120.0, 1.0, 5.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(x, y, max_relative = 1e-12);
        }
    }

    #[test]
    fn mid_and_deep_branches_agree_at_23_metres_above_the_third_band() {
        let a = profile_mid(120.0, 1.0, 23.0);
        let b = profile_deep(120.0, 1.0, 23.0);
        let in_band_2 = ((30.0 / 23.0) * 18.0) as usize;
        for z in 0..in_band_2 {
            assert_relative_eq!(a[z], b[z], max_relative = 1e-12);
        }
    }

    #[test]
    fn profile_decreases_with_depth() {
        for d in [3.0, 15.0, 40.0] {
            let iz = profile(150.0, 1.0, d);
            for pair in iz.windows(2) {
                assert!(pair[1] <= pair[0], "profile not monotone at depth {}", d);
            }
        }
    }

    #[test]
    fn zero_depth_collapses_to_surface_irradiance() {
        let iz = profile(80.0, 1.0, 0.0);
        assert!(iz.iter().all(|v| *v == 80.0));
    }

    #[test]
    fn steele_peaks_at_saturating_irradiance() {
        // With a degenerate (zero-depth) layer the average is the response
        // at the surface irradiance itself.
        let at_sat = steele_average(100.0, 1.0, 0.0, 100.0);
        assert_relative_eq!(at_sat, 1.0, max_relative = 1e-12);
        assert!(steele_average(300.0, 1.0, 0.0, 100.0) < at_sat);
        assert!(steele_average(30.0, 1.0, 0.0, 100.0) < at_sat);
    }

    #[test]
    fn monod_average_is_half_at_half_saturation() {
        assert_relative_eq!(monod_average(40.0, 1.0, 0.0, 40.0), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn light_at_depth_matches_first_band_attenuation() {
        let k = attenuation_coefficients(1.0);
        assert_relative_eq!(
            light_at_depth(200.0, 1.0),
            200.0 * (-5.0 * k[0]).exp(),
            max_relative = 1e-12
        );
    }
}
