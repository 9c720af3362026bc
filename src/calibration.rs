//! Field calibration of the baseline resistance
//!
//! With the sensor settled in air at the known atmospheric concentration, the power law can be
//! inverted to give the baseline resistance that makes the current reading come out at exactly
//! that concentration. Writing that baseline back is an explicit operator action, see
//! [`calibrate`].
use crate::config::{SensorConfig, SharedConfig};
use crate::error::Error;
use crate::reading::{AmbientConditions, RawReading};
use crate::resistance::{corrected_resistance, resistance};
use crate::Result;

/// Baseline resistance in kΩ implied by measuring `resistance` at the atmospheric reference
///
/// # Errors
/// Returns [`Error::InvalidCalibration`] if the power-law exponent is zero or the reference
/// concentration and coefficient do not give a positive, finite scale, and
/// [`Error::DomainError`] if `resistance` is not a positive, finite value.
#[allow(clippy::float_cmp)]
pub fn baseline_from_resistance(resistance: f64, config: &SensorConfig) -> Result<f64> {
    if config.power_law.b == 0.0 {
        return Err(Error::invalid_calibration("power-law exponent is zero"));
    }
    if !(resistance.is_finite() && resistance > 0.0) {
        return Err(Error::DomainError { resistance });
    }

    let ratio = config.atmospheric_ppm / config.power_law.a;
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(Error::invalid_calibration(format!(
            "reference concentration {} and coefficient {} give no usable ratio",
            config.atmospheric_ppm, config.power_law.a
        )));
    }

    let baseline = resistance * ratio.powf(config.power_law.b.recip());
    if !(baseline.is_finite() && baseline > 0.0) {
        return Err(Error::invalid_calibration(format!(
            "derived baseline resistance {baseline} is not positive and finite"
        )));
    }
    Ok(baseline)
}

/// Baseline resistance in kΩ for a raw reading taken at the atmospheric reference
///
/// # Errors
/// See [`resistance`] and [`baseline_from_resistance`].
pub fn calibration_baseline(raw: RawReading, config: &SensorConfig) -> Result<f64> {
    baseline_from_resistance(resistance(raw, config)?, config)
}

/// Baseline resistance in kΩ for a raw reading taken at the atmospheric reference, compensated for
/// temperature and humidity
///
/// # Errors
/// See [`corrected_resistance`] and [`baseline_from_resistance`].
pub fn corrected_calibration_baseline(
    raw: RawReading,
    ambient: AmbientConditions,
    config: &SensorConfig,
) -> Result<f64> {
    baseline_from_resistance(corrected_resistance(raw, ambient, config)?, config)
}

/// Derive a new baseline from `raw` and store it in `shared`, returning the stored value
///
/// When `ambient` is given the reading is compensated before the baseline is derived. Every
/// estimate computed after this returns uses the new baseline.
///
/// # Errors
/// Returns an error if the baseline cannot be derived from `raw`, in which case `shared` is left
/// as it was.
pub fn calibrate(
    shared: &SharedConfig,
    raw: RawReading,
    ambient: Option<AmbientConditions>,
) -> Result<f64> {
    let config = shared.snapshot();
    let baseline = match ambient {
        Some(ambient) => corrected_calibration_baseline(raw, ambient, &config)?,
        None => calibration_baseline(raw, &config)?,
    };
    shared.set_baseline_resistance(baseline)?;
    Ok(baseline)
}

#[cfg(test)]
mod tests {
    use ndarray_rand::rand::{Rng, SeedableRng};
    use proptest::prelude::*;
    use rand_isaac::Isaac64Rng;

    use super::{baseline_from_resistance, calibrate, calibration_baseline};
    use crate::concentration::{corrected_ppm, ppm, ppm_from_resistance};
    use crate::config::{SensorConfig, SharedConfig};
    use crate::error::Error;
    use crate::reading::{AmbientConditions, RawReading};

    #[test]
    fn baseline_scales_with_the_inverted_power_law() {
        let config = SensorConfig::default();
        let baseline = baseline_from_resistance(10.0, &config).unwrap();

        let expected = 10.0 * (397.13f64 / 116.602_068_2).powf(1.0 / 2.769_034_857);
        approx::assert_relative_eq!(baseline, expected);
    }

    #[test]
    fn zero_exponent_cannot_be_inverted() {
        let mut config = SensorConfig::default();
        config.power_law.b = 0.0;
        let result = baseline_from_resistance(10.0, &config);
        assert!(matches!(result, Err(Error::InvalidCalibration { .. })));
    }

    #[test]
    fn degenerate_reference_cannot_be_inverted() {
        let mut zero_coefficient = SensorConfig::default();
        zero_coefficient.power_law.a = 0.0;

        let mut negative_coefficient = SensorConfig::default();
        negative_coefficient.power_law.a = -116.6;

        let unbounded_reference = SensorConfig {
            atmospheric_ppm: f64::INFINITY,
            ..SensorConfig::default()
        };

        for config in [zero_coefficient, negative_coefficient, unbounded_reference] {
            let result = baseline_from_resistance(10.0, &config);
            assert!(
                matches!(result, Err(Error::InvalidCalibration { .. })),
                "{config:?}: {result:?}"
            );
        }
    }

    #[test]
    fn overflowing_baseline_is_rejected() {
        let mut config = SensorConfig::default();
        config.power_law.b = 1e-3;
        let result = baseline_from_resistance(10.0, &config);
        assert!(matches!(result, Err(Error::InvalidCalibration { .. })));
    }

    #[test]
    fn rail_readings_cannot_calibrate() {
        let config = SensorConfig::default();

        let bottom = calibration_baseline(RawReading(config.adc.min), &config);
        assert!(matches!(bottom, Err(Error::DivideByZero)));

        let top = calibration_baseline(RawReading(config.adc.max), &config);
        assert!(matches!(top, Err(Error::DomainError { .. })));
    }

    #[test]
    fn calibrated_reading_reports_the_atmospheric_reference() {
        let seed = 40;
        let mut rng = Isaac64Rng::seed_from_u64(seed);
        let shared = SharedConfig::default();
        let atmospheric_ppm = shared.snapshot().atmospheric_ppm;

        for _ in 0..16 {
            let raw = RawReading(rng.gen_range(1_000..23_000));
            let ambient =
                AmbientConditions::new(rng.gen_range(-10.0..40.0), rng.gen_range(10.0..90.0));

            calibrate(&shared, raw, None).unwrap();
            approx::assert_relative_eq!(
                ppm(raw, &shared.snapshot()).unwrap(),
                atmospheric_ppm,
                max_relative = 1e-6
            );

            calibrate(&shared, raw, Some(ambient)).unwrap();
            approx::assert_relative_eq!(
                corrected_ppm(raw, ambient, &shared.snapshot()).unwrap(),
                atmospheric_ppm,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn failed_calibration_keeps_the_previous_baseline() {
        let shared = SharedConfig::default();
        let before = shared.baseline_resistance();

        let result = calibrate(&shared, RawReading(0), None);

        assert!(matches!(result, Err(Error::DivideByZero)));
        approx::assert_relative_eq!(shared.baseline_resistance(), before);
    }

    proptest! {
        #[test]
        fn calibration_round_trips_through_the_power_law(r in 1e-3..1e4f64) {
            let mut config = SensorConfig::default();
            config.baseline_resistance = baseline_from_resistance(r, &config).unwrap();

            let concentration = ppm_from_resistance(r, &config).unwrap();
            approx::assert_relative_eq!(
                concentration,
                config.atmospheric_ppm,
                max_relative = 1e-6
            );
        }
    }
}
