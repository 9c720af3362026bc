use crate::config::SensorConfig;
use crate::error::Error;
use crate::reading::{AmbientConditions, RawReading};
use crate::resistance::{corrected_resistance, resistance};
use crate::Result;

/// Concentration in ppm for a given sensor resistance, `a * (R / R0) ^ -b`
///
/// For a positive exponent the concentration falls as the resistance rises: a more resistive
/// element means cleaner air.
///
/// # Errors
/// Returns [`Error::InvalidCalibration`] if the baseline resistance or the coefficient is not a
/// positive, finite value or the exponent is zero, and [`Error::DomainError`] if `resistance` is
/// not a positive, finite value.
pub fn ppm_from_resistance(resistance: f64, config: &SensorConfig) -> Result<f64> {
    check_calibration(config)?;
    if !(resistance.is_finite() && resistance > 0.0) {
        return Err(Error::DomainError { resistance });
    }

    let ratio = resistance / config.baseline_resistance;
    Ok(config.power_law.a * ratio.powf(-config.power_law.b))
}

/// Concentration in ppm for a raw reading, without ambient compensation
///
/// # Errors
/// See [`resistance`] and [`ppm_from_resistance`].
pub fn ppm(raw: RawReading, config: &SensorConfig) -> Result<f64> {
    ppm_from_resistance(resistance(raw, config)?, config)
}

/// Concentration in ppm for a raw reading, compensated for temperature and humidity
///
/// # Errors
/// See [`corrected_resistance`] and [`ppm_from_resistance`].
pub fn corrected_ppm(
    raw: RawReading,
    ambient: AmbientConditions,
    config: &SensorConfig,
) -> Result<f64> {
    ppm_from_resistance(corrected_resistance(raw, ambient, config)?, config)
}

#[allow(clippy::float_cmp)]
fn check_calibration(config: &SensorConfig) -> Result<()> {
    let baseline = config.baseline_resistance;
    if !(baseline.is_finite() && baseline > 0.0) {
        return Err(Error::invalid_calibration(format!(
            "baseline resistance must be positive and finite, got {baseline}"
        )));
    }
    let a = config.power_law.a;
    if !(a.is_finite() && a > 0.0) {
        return Err(Error::invalid_calibration(format!(
            "power-law coefficient must be positive and finite, got {a}"
        )));
    }
    if config.power_law.b == 0.0 || !config.power_law.b.is_finite() {
        return Err(Error::invalid_calibration(format!(
            "power-law exponent must be non-zero and finite, got {}",
            config.power_law.b
        )));
    }
    Ok(())
}
