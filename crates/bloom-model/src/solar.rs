//! Clear-sky surface irradiance from astronomical formulas.
//!
//! Used to synthesize photosynthetically active radiation (PAR) when a
//! measured series is unavailable. Solar declination follows Kirk (1994),
//! the clear-sky attenuation Lumb (1964).

use bloom_core::timeseries::FloatValue;
use std::f64::consts::PI;

/// Solar constant (W m^-2).
const SOLAR_CONSTANT: FloatValue = 1373.0;

/// Cloudiness as a constant fraction.
const CLOUDINESS: FloatValue = 0.75;

/// Transmittance through the sea surface.
const TRANSMITTANCE: FloatValue = 0.75;

/// Fraction of total irradiance falling in the PAR band (400-700 nm).
const PAR_FRACTION: FloatValue = 0.48;

/// A location for which surface irradiance is computed.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    /// Latitude in degrees, north positive
    pub latitude: FloatValue,
    /// Longitude in degrees, east positive
    pub longitude: FloatValue,
}

impl Site {
    /// The southeastern Bering Sea shelf.
    pub fn bering_sea() -> Self {
        Self {
            latitude: 58.0,
            longitude: -165.0,
        }
    }
}

/// Clear-sky below-surface PAR (W m^-2) at a given hour of the year.
///
/// The hour is GMT; it is converted to local solar time from the site
/// longitude before the zenith angle is computed. Night hours return zero.
pub fn clear_sky_irradiance(site: Site, hour_of_year: FloatValue) -> FloatValue {
    let mut date = (hour_of_year / 24.0).trunc();
    let gmt = hour_of_year - 24.0 * date;

    let mut ltime = gmt + 12.0 * site.longitude / 180.0;
    if ltime > 24.0 {
        ltime -= 24.0;
        date += 1.0;
    } else if ltime < 0.0 {
        ltime += 24.0;
        date -= 1.0;
    }

    let rlat = (PI / 180.0) * site.latitude;
    let psi = 2.0 * PI * (date / 365.0);
    let tau = 2.0 * PI * (ltime / 24.0);

    // solar declination in degrees (Kirk, eq. 2.2)
    let delta = 0.39637 - 22.9133 * psi.cos() + 4.02543 * psi.sin() - 0.3872 * (2.0 * psi).cos()
        + 0.052 * (2.0 * psi).sin();
    let delta = (PI / 180.0) * delta;

    // elevation angle, then zenith angle
    let beta = (rlat.sin() * delta.sin() - rlat.cos() * delta.cos() * tau.cos()).asin();
    let theta = PI / 2.0 - beta;

    let ed1 = (SOLAR_CONSTANT * theta.cos()).max(0.0);

    ed1 * (1.0 - 0.7 * CLOUDINESS) * TRANSMITTANCE * PAR_FRACTION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_is_dark_and_noon_is_not() {
        let site = Site::bering_sea();
        // Midsummer, day 172. At 165 W local time is GMT - 11 h, so local
        // noon falls at 23:00 GMT.
        let midsummer_noon = 172.0 * 24.0 + 23.0;
        let midsummer_midnight = 172.0 * 24.0 + 11.0;
        assert!(clear_sky_irradiance(site, midsummer_noon) > 100.0);
        assert_eq!(clear_sky_irradiance(site, midsummer_midnight), 0.0);
    }

    #[test]
    fn summer_noon_outshines_winter_noon() {
        let site = Site::bering_sea();
        let summer = clear_sky_irradiance(site, 172.0 * 24.0 + 23.0);
        let winter = clear_sky_irradiance(site, 355.0 * 24.0 + 23.0);
        assert!(summer > winter);
    }

    #[test]
    fn irradiance_never_negative_over_a_year() {
        let site = Site::bering_sea();
        for h in (0..8760).step_by(7) {
            assert!(clear_sky_irradiance(site, h as FloatValue) >= 0.0);
        }
    }
}
