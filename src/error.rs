use thiserror::Error;

/// Failures surfaced by the estimation engine and its configuration layer.
///
/// Arithmetic hazards are detected where they occur and handed straight back to the caller. The
/// computations are deterministic, so none of these are worth retrying without fresh input.
#[derive(Debug, Error)]
pub enum Error {
    /// A degenerate remap range, or a reading sitting on the bottom rail of the ADC
    #[error("division by zero: the input range is degenerate or the reading is at the rail")]
    DivideByZero,
    /// A non-positive resistance fed into the fractional power-law model
    #[error("resistance {resistance} kΩ is outside the domain of the power-law model")]
    DomainError { resistance: f64 },
    #[error("invalid calibration: {reason}")]
    InvalidCalibration { reason: String },
    #[error("invalid sensor configuration: {reason}")]
    InvalidConfig { reason: String },
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A raw-reading or ambient-conditions source could not produce a value
    #[error("acquisition failed: {reason}")]
    Acquisition { reason: String },
}

impl Error {
    pub(crate) fn invalid_calibration(reason: impl Into<String>) -> Self {
        Self::InvalidCalibration {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
