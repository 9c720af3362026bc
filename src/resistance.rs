use crate::config::SensorConfig;
use crate::correction::correction_factor;
use crate::error::Error;
use crate::math::remap;
use crate::reading::{AmbientConditions, RawReading};
use crate::Result;

/// Full scale of the 10-bit range the sensor curves are specified against
pub const FULL_SCALE: f64 = 1023.0;

/// Map a raw count onto the 10-bit scale, saturating at the reportable range of the ADC
///
/// # Errors
/// Returns [`Error::DivideByZero`] if the configured ADC range is degenerate.
pub fn scaled_reading(raw: RawReading, config: &SensorConfig) -> Result<f64> {
    remap(
        f64::from(raw.count()),
        f64::from(config.adc.min),
        f64::from(config.adc.max),
        0.0,
        FULL_SCALE,
    )
}

/// Resistance of the sensing element in kΩ, from the voltage divider formed with the load resistor
///
/// # Errors
/// Returns [`Error::DivideByZero`] when the reading sits at or below the bottom of the ADC range,
/// where the resistance is unbounded.
#[allow(clippy::float_cmp)]
pub fn resistance(raw: RawReading, config: &SensorConfig) -> Result<f64> {
    let scaled = scaled_reading(raw, config)?;
    if scaled == 0.0 {
        return Err(Error::DivideByZero);
    }
    Ok((FULL_SCALE / scaled - 1.0) * config.load_resistance)
}

/// Resistance in kΩ compensated for temperature and humidity
///
/// # Errors
/// See [`resistance`].
pub fn corrected_resistance(
    raw: RawReading,
    ambient: AmbientConditions,
    config: &SensorConfig,
) -> Result<f64> {
    Ok(resistance(raw, config)? / correction_factor(ambient, &config.correction))
}
