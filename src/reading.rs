use serde::{Deserialize, Serialize};

/// A raw count from the analog front end
///
/// Counts outside the reportable range of the device are accepted here and saturated later, when
/// they are mapped onto the 10-bit scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReading(pub u32);

impl RawReading {
    pub const fn count(self) -> u32 {
        self.0
    }
}

impl From<u32> for RawReading {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

/// Ambient conditions reported by the companion temperature and humidity sensor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    /// Air temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent, nominally in `[0, 100]` though this is not enforced
    pub humidity: f64,
}

impl AmbientConditions {
    pub const fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}
