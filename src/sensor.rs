//! Acquisition ports and a sensor facade binding them to the estimators
//!
//! Hardware is reached only through [`RawSource`] and [`AmbientSource`], so the estimation
//! pipeline runs the same against an ADC on a bus, a replayed log or a test double.
use serde::{Deserialize, Serialize};

use crate::calibration;
use crate::concentration;
use crate::config::SharedConfig;
use crate::reading::{AmbientConditions, RawReading};
use crate::resistance;
use crate::Result;

/// Port for the analog channel the gas sensor is wired to
pub trait RawSource {
    /// # Errors
    /// Returns [`crate::Error::Acquisition`] if the channel cannot be read.
    fn read_raw(&mut self) -> Result<RawReading>;
}

/// Port for the companion temperature and humidity sensor
pub trait AmbientSource {
    /// # Errors
    /// Returns [`crate::Error::Acquisition`] if the sensor cannot be read.
    fn read_ambient(&mut self) -> Result<AmbientConditions>;
}

impl<T: RawSource + ?Sized> RawSource for &mut T {
    fn read_raw(&mut self) -> Result<RawReading> {
        (**self).read_raw()
    }
}

impl<T: AmbientSource + ?Sized> AmbientSource for &mut T {
    fn read_ambient(&mut self) -> Result<AmbientConditions> {
        (**self).read_ambient()
    }
}

/// A combined reading of ambient conditions and compensated concentration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub temperature: f64,
    pub humidity: f64,
    /// Compensated concentration in ppm
    #[serde(rename = "air quality")]
    pub air_quality: f64,
}

/// A gas sensor: an analog source plus the configuration used to interpret it
///
/// Every accessor takes one fresh reading from the source and evaluates it against a single
/// snapshot of the configuration.
pub struct GasSensor<S> {
    source: S,
    config: SharedConfig,
}

impl<S: RawSource> GasSensor<S> {
    pub const fn new(source: S, config: SharedConfig) -> Self {
        Self { source, config }
    }

    pub const fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Sensor resistance in kΩ
    ///
    /// # Errors
    /// Fails if the source cannot be read or the reading is at the bottom rail.
    pub fn resistance(&mut self) -> Result<f64> {
        let raw = self.source.read_raw()?;
        resistance::resistance(raw, &self.config.snapshot())
    }

    /// Sensor resistance in kΩ compensated for `ambient`
    ///
    /// # Errors
    /// See [`GasSensor::resistance`].
    pub fn corrected_resistance(&mut self, ambient: AmbientConditions) -> Result<f64> {
        let raw = self.source.read_raw()?;
        resistance::corrected_resistance(raw, ambient, &self.config.snapshot())
    }

    /// Concentration in ppm without ambient compensation
    ///
    /// # Errors
    /// Fails if the source cannot be read or the reading falls outside the concentration model.
    pub fn ppm(&mut self) -> Result<f64> {
        let raw = self.source.read_raw()?;
        concentration::ppm(raw, &self.config.snapshot())
    }

    /// Concentration in ppm compensated for `ambient`
    ///
    /// # Errors
    /// See [`GasSensor::ppm`].
    pub fn corrected_ppm(&mut self, ambient: AmbientConditions) -> Result<f64> {
        let raw = self.source.read_raw()?;
        concentration::corrected_ppm(raw, ambient, &self.config.snapshot())
    }

    /// Baseline resistance in kΩ implied by the current reading, without storing it
    ///
    /// # Errors
    /// See [`GasSensor::ppm`].
    pub fn calibration_baseline(&mut self) -> Result<f64> {
        let raw = self.source.read_raw()?;
        calibration::calibration_baseline(raw, &self.config.snapshot())
    }

    /// Compensated baseline resistance in kΩ implied by the current reading, without storing it
    ///
    /// # Errors
    /// See [`GasSensor::ppm`].
    pub fn corrected_calibration_baseline(&mut self, ambient: AmbientConditions) -> Result<f64> {
        let raw = self.source.read_raw()?;
        calibration::corrected_calibration_baseline(raw, ambient, &self.config.snapshot())
    }

    /// Recalibrate against the atmospheric reference and store the new baseline
    ///
    /// Only call this with the sensor settled in air at the configured reference concentration.
    ///
    /// # Errors
    /// Fails if the source cannot be read or no baseline can be derived from the reading. The
    /// stored baseline is unchanged on failure.
    pub fn calibrate(&mut self, ambient: Option<AmbientConditions>) -> Result<f64> {
        let raw = self.source.read_raw()?;
        calibration::calibrate(&self.config, raw, ambient)
    }

    /// Read ambient conditions and the compensated concentration together
    ///
    /// Sources can be lent by mutable reference, so one ambient sensor can serve several reports
    /// and stay with the caller afterwards.
    ///
    /// ```
    /// use air_quality::{
    ///     AmbientConditions, AmbientSource, GasSensor, RawReading, RawSource, Result, SharedConfig,
    /// };
    ///
    /// struct Adc(u32);
    ///
    /// impl RawSource for Adc {
    ///     fn read_raw(&mut self) -> Result<RawReading> {
    ///         Ok(RawReading(self.0))
    ///     }
    /// }
    ///
    /// struct Htu21d {
    ///     reads: usize,
    /// }
    ///
    /// impl AmbientSource for Htu21d {
    ///     fn read_ambient(&mut self) -> Result<AmbientConditions> {
    ///         self.reads += 1;
    ///         Ok(AmbientConditions::new(21.0, 45.0))
    ///     }
    /// }
    ///
    /// let mut climate = Htu21d { reads: 0 };
    /// let mut sensor = GasSensor::new(Adc(12_000), SharedConfig::default());
    ///
    /// let first = sensor.report(&mut climate).unwrap();
    /// let second = sensor.report(&mut climate).unwrap();
    ///
    /// assert_eq!(first, second);
    /// assert_eq!(climate.reads, 2);
    /// ```
    ///
    /// # Errors
    /// Fails if either source cannot be read or the concentration cannot be estimated.
    pub fn report(&mut self, mut ambient_source: impl AmbientSource) -> Result<Report> {
        let ambient = ambient_source.read_ambient()?;
        let air_quality = self.corrected_ppm(ambient)?;
        Ok(Report {
            temperature: ambient.temperature,
            humidity: ambient.humidity,
            air_quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::{AmbientSource, GasSensor, RawSource};
    use crate::concentration;
    use crate::config::SharedConfig;
    use crate::error::Error;
    use crate::reading::{AmbientConditions, RawReading};
    use crate::Result;

    struct Replay(VecDeque<u32>);

    impl RawSource for Replay {
        fn read_raw(&mut self) -> Result<RawReading> {
            self.0
                .pop_front()
                .map(RawReading)
                .ok_or_else(|| Error::Acquisition {
                    reason: "replay exhausted".to_owned(),
                })
        }
    }

    struct Fixed(AmbientConditions);

    impl AmbientSource for Fixed {
        fn read_ambient(&mut self) -> Result<AmbientConditions> {
            Ok(self.0)
        }
    }

    #[test]
    fn each_accessor_consumes_one_reading() {
        let mut sensor = GasSensor::new(
            Replay(VecDeque::from([9_000, 9_000])),
            SharedConfig::default(),
        );

        sensor.ppm().unwrap();
        sensor.ppm().unwrap();
        assert!(matches!(sensor.ppm(), Err(Error::Acquisition { .. })));
    }

    #[test]
    fn ppm_accessor_matches_the_estimator() {
        let config = SharedConfig::default();
        let mut sensor = GasSensor::new(Replay(VecDeque::from([9_000])), config.clone());

        let expected = concentration::ppm(RawReading(9_000), &config.snapshot()).unwrap();
        approx::assert_relative_eq!(sensor.ppm().unwrap(), expected);
    }

    #[test]
    fn report_carries_the_ambient_conditions() {
        let config = SharedConfig::default();
        let ambient = AmbientConditions::new(22.5, 47.0);
        let mut sensor = GasSensor::new(Replay(VecDeque::from([12_000])), config.clone());

        let report = sensor.report(Fixed(ambient)).unwrap();

        let expected =
            concentration::corrected_ppm(RawReading(12_000), ambient, &config.snapshot()).unwrap();
        approx::assert_relative_eq!(report.temperature, 22.5);
        approx::assert_relative_eq!(report.humidity, 47.0);
        approx::assert_relative_eq!(report.air_quality, expected);
    }

    #[test]
    fn calibration_is_shared_through_the_sensor_config() {
        let config = SharedConfig::default();
        let mut sensor = GasSensor::new(Replay(VecDeque::from([9_000, 11_000])), config.clone());

        let baseline = sensor.calibrate(None).unwrap();

        approx::assert_relative_eq!(sensor.config().baseline_resistance(), baseline);
        approx::assert_relative_eq!(config.baseline_resistance(), baseline);

        let remaining = sensor.into_inner();
        assert_eq!(remaining.0, VecDeque::from([11_000]));
    }

    #[test]
    fn borrowed_sources_can_be_lent_to_a_sensor() {
        let mut replay = Replay(VecDeque::from([7_000, 8_000]));
        {
            let mut sensor = GasSensor::new(&mut replay, SharedConfig::default());
            sensor.resistance().unwrap();
        }
        assert_eq!(replay.0, VecDeque::from([8_000]));
    }
}
