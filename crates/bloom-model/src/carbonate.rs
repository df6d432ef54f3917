//! Seawater carbonate chemistry.
//!
//! The solver follows Peng et al. (1987) and Millero (1995): carbonic acid
//! dissociation constants from Mehrbach et al. (1973), boric acid from
//! Lyman, CO2 solubility from Weiss (1974), calcite and aragonite
//! solubility from Mucci (1983), all pressure-corrected for a nominal 3 m
//! depth. Air-sea exchange uses the Wanninkhof (1992) gas transfer
//! parameterization.
//!
//! Alkalinity species are solved by fixed-point iteration on the hydrogen
//! ion concentration. [`ConvergenceMode::FixedCount`] always runs the full
//! iteration budget, so equal inputs give bit-identical results;
//! [`ConvergenceMode::Tolerance`] stops once the hydrogen ion estimate is
//! stable to 5e-5 relative and reports whether it got there.

use bloom_core::timeseries::FloatValue;

/// Relative tolerance on successive hydrogen ion estimates.
const H_TOLERANCE: FloatValue = 0.5e-4;

/// Iteration budget of the fixed-point loop.
const MAX_ITERATIONS: usize = 100;

/// Nominal depth (m) for the pressure corrections on the dissociation
/// constants.
const PRESSURE_DEPTH: FloatValue = 3.0;

/// Ideal gas constant, cm^3 bar mol^-1 K^-1.
const GAS_CONSTANT: FloatValue = 83.143;

/// How the alkalinity-species iteration terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergenceMode {
    /// Run the full iteration budget unconditionally.
    #[default]
    FixedCount,
    /// Stop at [`H_TOLERANCE`] relative change, up to the budget.
    Tolerance,
}

/// Everything one carbonate-system solve yields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonateSolution {
    /// Partial pressure of CO2 in seawater (atm)
    pub pco2: FloatValue,
    /// Carbonate ion concentration (umol kg^-1)
    pub carbonate: FloatValue,
    /// Calcite saturation state
    pub omega_calcite: FloatValue,
    /// Aragonite saturation state
    pub omega_aragonite: FloatValue,
    /// pH on the free scale
    pub ph: FloatValue,
    /// Bicarbonate ion concentration (umol kg^-1)
    pub bicarbonate: FloatValue,
    /// Dissolved CO2 concentration (umol kg^-1)
    pub co2_aq: FloatValue,
    /// Iterations taken by the hydrogen ion loop
    pub iterations: usize,
    /// Whether the final estimate met the tolerance
    pub converged: bool,
}

/// Selector for a single quantity out of [`CarbonateSolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarbonateQuantity {
    PCo2,
    Carbonate,
    OmegaCalcite,
    OmegaAragonite,
    Ph,
    Bicarbonate,
    Co2Aq,
}

/// Gas transfer (piston) velocity in m h^-1.
///
/// Wanninkhof (1992) eq. 8 with the Schmidt number polynomial from its
/// table A1. Wind speed in m s^-1, temperature in degC. Pure: repeat calls
/// with equal inputs are bit-identical.
pub fn gas_transfer_velocity(wind_speed: FloatValue, temperature: FloatValue) -> FloatValue {
    let te = temperature;
    let sc = 2073.1 - 125.62 * te + 3.6276 * te * te - 0.043219 * te * te * te;

    // cm h^-1
    let gastv = (2.5 * (0.5246 + 1.6256e-2 * te + 4.9946e-4 * te * te)
        + 0.3 * wind_speed * wind_speed)
        * (sc / 660.0).powf(-0.5);

    gastv / 100.0
}

/// CO2 solubility in seawater (umol kg^-1 atm^-1), Weiss (1974).
pub fn co2_solubility(salinity: FloatValue, temperature: FloatValue) -> FloatValue {
    let tek = temperature + 273.15;
    let csw = (-60.2409 + 9345.17 / tek + 23.3585 * (tek / 100.0).ln()
        + salinity
            * (0.023517 - 0.023656 * (tek / 100.0) + 0.0047036 * (tek / 100.0) * (tek / 100.0)))
        .exp();
    csw * 1.0e6
}

/// Solve the full carbonate system.
///
/// Inputs: salinity, temperature in degC, total alkalinity in uEq kg^-1,
/// total CO2 in umol kg^-1, silicate in mmol Si m^-3.
pub fn solve(
    salinity: FloatValue,
    temperature: FloatValue,
    alkalinity: FloatValue,
    total_co2: FloatValue,
    silicate: FloatValue,
    mode: ConvergenceMode,
) -> CarbonateSolution {
    let sa = salinity;
    let te = temperature;
    let al = alkalinity * 1.0e-6; // Eq kg^-1
    let si = silicate * 1.0e-6; // mol kg^-1
    let co = total_co2 * 1.0e-6; // mol kg^-1

    let tek = te + 273.15;
    let pres = PRESSURE_DEPTH / 10.0; // bar
    let cp = pres / GAS_CONSTANT / tek;

    // carbonic acid (Mehrbach et al. 1973), pressure-corrected
    let mut kc1 = 13.7201 - 0.031334 * tek - 3235.76 / tek - 1.3e-5 * sa * tek
        + 0.1032 * sa.powf(0.5);
    kc1 = 10.0f64.powf(kc1);
    kc1 *= ((24.2 - 0.085 * te) * cp).exp();

    let mut kc2 = -5371.9645 - 1.671221 * tek + 128375.28 / tek
        + 2194.3055 * tek.ln() / 2.30259
        - 0.22913 * sa
        - 18.3802 * sa.ln() / 2.30259
        + 8.0944e-4 * sa * tek
        + 5617.11 * sa.ln() / tek / 2.30259
        - 2.136 * sa / tek;
    kc2 = 10.0f64.powf(kc2);
    kc2 *= ((16.4 - 0.04 * te) * cp).exp();

    // boric acid (Lyman), pressure-corrected
    let mut kb = 2291.9 / tek + 0.01756 * tek - 3.385 - 0.32051 * (sa / 1.80655).powf(1.0 / 3.0);
    kb = 10.0f64.powf(-kb);
    kb *= ((27.5 - 0.095 * te) * cp).exp();

    // water in seawater (Millero 1979)
    let kw = (148.9802 - 13847.26 / tek - 23.6521 * tek.ln() - 0.019813 * sa
        + sa.powf(0.5) * (-79.2447 + 3298.72 / tek + 12.0408 * tek.ln()))
    .exp();

    // total activity coefficient for the hydrogen ion
    let fh = 1.29 - 0.00204 * tek + 4.6e-4 * sa * sa - 1.48e-6 * sa * sa * tek;

    // total borate
    let bo = 4.106e-4 * (sa / 35.0);

    let c1 = kc1 / 2.0;
    let c2 = 1.0 - 4.0 * kc2 / kc1;

    // Iterate the alkalinity species from a trial hydrogen ion value. The
    // carbonate alkalinity from the final pass is kept for the carbonate
    // ion below.
    let mut aht: FloatValue = 1.0e-8;
    let mut ah1 = 0.0;
    let mut ac = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        let ab = bo * kb / (aht + kb); // borate alkalinity
        let asi = si * 4.0e-10 / (aht + 4.0e-10); // silicate alkalinity
        let aw = (kw * fh / aht) - (aht / fh); // water alkalinity

        ac = al - ab - asi - aw; // carbonate alkalinity

        let x = ac / co;
        ah1 = c1 / x * (1.0 - x + (1.0 + c2 * x * (-2.0 + x)).sqrt());

        let rel = (1.0 - aht / ah1).abs();
        aht = ah1;
        iterations += 1;

        if rel < H_TOLERANCE {
            converged = true;
            if mode == ConvergenceMode::Tolerance {
                break;
            }
        } else {
            converged = false;
        }
    }

    if !converged {
        log::warn!(
            "carbonate iteration did not converge after {} steps (S={}, T={})",
            iterations,
            sa,
            te
        );
    }

    let co3 = (ac - co) / (1.0 - (ah1 * ah1) / (kc1 * kc2));
    let hco3 = co / (1.0 + ah1 / kc1 + kc2 / ah1);
    let co2 = co / (1.0 + kc1 / ah1 + kc1 * kc2 / (ah1 * ah1));

    // CO2 solubility (Weiss 1974), mol kg^-1 atm^-1
    let khco2 = (-60.2409 + 9345.17 / tek + 23.3585 * (tek / 100.0).ln()
        + sa * (0.023517 - 2.3656e-4 * tek + 4.7036e-7 * tek * tek))
        .exp();

    let pco2 = co2 / khco2; // atm

    let hplus = kc2 * hco3 / co3;
    let ph = -hplus.ln() / 2.303;

    // [Ca++] from salinity (Millero, eq. 127)
    let calcium = 0.01028 * (sa / 35.0);

    // calcite and aragonite stoichiometric solubility (Mucci 1983)
    let lnksp0_cal = -395.8293 + 6537.773 / tek + 71.595 * tek.ln() - 0.17959 * tek;
    let lnksp0_arag = -395.9180 + 6685.079 / tek + 71.595 * tek.ln() - 0.17959 * tek;

    let mut kcal = (lnksp0_cal
        + (-1.78938 + 410.64 / tek + 0.0065453 * tek) * sa.sqrt()
        - 0.17755 * sa
        + 0.0094979 * sa.powf(1.5))
    .exp();
    let mut karag = (lnksp0_arag
        + (-0.157481 + 202.938 / tek + 0.0039780 * tek) * sa.sqrt()
        - 0.23067 * sa
        + 0.0136808 * sa.powf(1.5))
    .exp();

    // pressure corrections via partial molal volume and compressibility
    let saltrat = sa.sqrt() / 35.0f64.sqrt();
    let dvc = -45.464 + 0.3529 * te - 4.985 * te * te * 1.0e-3 * saltrat;
    let dkc = (-13.70 + 0.1245 * te) * 1.0e-3 * saltrat;
    let dva = -42.680 + 0.3529 * te - 4.985 * te * te * 1.0e-3 * saltrat;
    let dka = (-13.70 + 0.1245 * te) * 1.0e-3 * saltrat;

    kcal *= (-dvc * cp + 0.5 * dkc * (pres * pres) / GAS_CONSTANT / tek).exp();
    karag *= (-dva * cp + 0.5 * dka * (pres * pres) / GAS_CONSTANT / tek).exp();

    CarbonateSolution {
        pco2,
        carbonate: co3 * 1.0e6,
        omega_calcite: (calcium * co3) / kcal,
        omega_aragonite: (calcium * co3) / karag,
        ph,
        bicarbonate: hco3 * 1.0e6,
        co2_aq: co2 * 1.0e6,
        iterations,
        converged,
    }
}

/// Single-quantity view over [`solve`].
pub fn solve_for(
    salinity: FloatValue,
    temperature: FloatValue,
    alkalinity: FloatValue,
    total_co2: FloatValue,
    silicate: FloatValue,
    mode: ConvergenceMode,
    quantity: CarbonateQuantity,
) -> FloatValue {
    let solution = solve(salinity, temperature, alkalinity, total_co2, silicate, mode);
    match quantity {
        CarbonateQuantity::PCo2 => solution.pco2,
        CarbonateQuantity::Carbonate => solution.carbonate,
        CarbonateQuantity::OmegaCalcite => solution.omega_calcite,
        CarbonateQuantity::OmegaAragonite => solution.omega_aragonite,
        CarbonateQuantity::Ph => solution.ph,
        CarbonateQuantity::Bicarbonate => solution.bicarbonate,
        CarbonateQuantity::Co2Aq => solution.co2_aq,
    }
}
