//! Sensor constants and the shared, calibratable configuration record
//!
//! A [`SensorConfig`] is usually read from a small TOML file alongside the deployment, e.g.
//!
//! ```toml
//! load_resistance = 4.2
//! baseline_resistance = 76.63
//! atmospheric_ppm = 397.13
//!
//! [adc]
//! min = 110
//! max = 23797
//!
//! [power_law]
//! a = 116.6020682
//! b = 2.769034857
//! ```
//!
//! Any field left out of the file falls back to the factory value.
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::Result;

/// The range of counts the analog front end can actually report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdcRange {
    pub min: u32,
    pub max: u32,
}

impl Default for AdcRange {
    fn default() -> Self {
        Self {
            min: 110,
            max: 23797,
        }
    }
}

/// Coefficients of `ppm = a * (R / R0) ^ -b`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerLaw {
    pub a: f64,
    pub b: f64,
}

impl Default for PowerLaw {
    fn default() -> Self {
        Self {
            a: 116.602_068_2,
            b: 2.769_034_857,
        }
    }
}

/// Empirical temperature and humidity dependence of the sensing element
///
/// `a` to `d` describe the response below 20 °C, `e` to `g` the response at and above it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
}

impl Default for CorrectionCoefficients {
    fn default() -> Self {
        Self {
            a: 0.000_35,
            b: 0.027_18,
            c: 1.395_38,
            d: 0.001_8,
            e: -0.003_333_333,
            f: -0.001_923_077,
            g: 1.130_128_205,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Load resistor on the board, in kΩ
    pub load_resistance: f64,
    /// Sensor resistance at the atmospheric reference concentration, in kΩ
    pub baseline_resistance: f64,
    /// Atmospheric concentration used as the calibration reference, in ppm
    pub atmospheric_ppm: f64,
    pub adc: AdcRange,
    pub power_law: PowerLaw,
    pub correction: CorrectionCoefficients,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            load_resistance: 4.2,
            baseline_resistance: 76.63,
            atmospheric_ppm: 397.13,
            adc: AdcRange::default(),
            power_law: PowerLaw::default(),
            correction: CorrectionCoefficients::default(),
        }
    }
}

impl SensorConfig {
    /// Parse and validate a configuration from TOML
    ///
    /// # Errors
    /// Returns an error if the document is malformed or describes an unusable sensor.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a TOML file on disk
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, or for the reasons given in
    /// [`SensorConfig::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(?path, "reading sensor configuration");
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(
            baseline_resistance = config.baseline_resistance,
            "loaded sensor configuration"
        );
        Ok(config)
    }

    /// Serialise the configuration so a freshly calibrated baseline survives a restart
    ///
    /// # Errors
    /// Returns an error if serialisation fails.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Check the invariants the estimators rely on
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming the first violated constraint.
    #[allow(clippy::float_cmp)]
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("load_resistance", self.load_resistance),
            ("baseline_resistance", self.baseline_resistance),
            ("atmospheric_ppm", self.atmospheric_ppm),
            ("power_law.a", self.power_law.a),
            ("power_law.b", self.power_law.b),
            ("correction.a", self.correction.a),
            ("correction.b", self.correction.b),
            ("correction.c", self.correction.c),
            ("correction.d", self.correction.d),
            ("correction.e", self.correction.e),
            ("correction.f", self.correction.f),
            ("correction.g", self.correction.g),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Error::invalid_config(format!("{name} must be finite")));
        }

        let positive = [
            ("load_resistance", self.load_resistance),
            ("baseline_resistance", self.baseline_resistance),
            ("atmospheric_ppm", self.atmospheric_ppm),
            ("power_law.a", self.power_law.a),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(Error::invalid_config(format!(
                "{name} must be positive, got {value}"
            )));
        }

        if self.power_law.b == 0.0 {
            return Err(Error::invalid_config("power_law.b must be non-zero"));
        }

        if self.adc.min >= self.adc.max {
            return Err(Error::invalid_config(format!(
                "adc range [{}, {}] is empty",
                self.adc.min, self.adc.max
            )));
        }

        Ok(())
    }
}

/// A configuration shared between readers and the calibration workflow
///
/// Readers take a copy of the whole record, so an estimate is always computed against a single
/// consistent baseline even while a calibration write is in flight. Clones share the same record.
#[derive(Clone, Debug)]
pub struct SharedConfig {
    inner: Arc<RwLock<SensorConfig>>,
}

impl SharedConfig {
    /// # Errors
    /// Returns an error if `config` fails [`SensorConfig::validate`].
    pub fn new(config: SensorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
        })
    }

    pub fn snapshot(&self) -> SensorConfig {
        *self.inner.read()
    }

    pub fn baseline_resistance(&self) -> f64 {
        self.inner.read().baseline_resistance
    }

    /// Replace the calibration baseline, returning the value it replaced
    ///
    /// This is the only way the configuration changes after construction.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCalibration`] if `baseline_resistance` is not a positive, finite
    /// resistance. The stored value is left untouched in that case.
    pub fn set_baseline_resistance(&self, baseline_resistance: f64) -> Result<f64> {
        if !(baseline_resistance.is_finite() && baseline_resistance > 0.0) {
            warn!(baseline_resistance, "rejected calibration baseline");
            return Err(Error::invalid_calibration(format!(
                "baseline resistance must be positive and finite, got {baseline_resistance}"
            )));
        }

        let previous = {
            let mut config = self.inner.write();
            std::mem::replace(&mut config.baseline_resistance, baseline_resistance)
        };
        info!(
            previous,
            current = baseline_resistance,
            "updated calibration baseline"
        );
        Ok(previous)
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SensorConfig::default())),
        }
    }
}
