//! Temperature and humidity compensation for the sensing element
//!
//! The sensor's resistance drifts with ambient conditions. The drift is modelled by an empirical
//! factor that the raw resistance is divided by: a quadratic in temperature below 20 °C, linear
//! above, each linearised in humidity.
//!
//! The two branches are separate fits and do not meet at 20 °C. The step is part of the fitted
//! model and is kept as is.
use crate::config::CorrectionCoefficients;
use crate::reading::AmbientConditions;

/// Temperature at which the model switches from the cold fit to the warm fit, in °C
pub const BRANCH_TEMPERATURE: f64 = 20.0;

/// Humidity the cold branch is linearised about, in %RH
const REFERENCE_HUMIDITY: f64 = 33.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectionBranch {
    /// Below [`BRANCH_TEMPERATURE`]
    Cold,
    /// At or above [`BRANCH_TEMPERATURE`]
    Warm,
}

impl CorrectionBranch {
    pub fn for_temperature(temperature: f64) -> Self {
        if temperature < BRANCH_TEMPERATURE {
            Self::Cold
        } else {
            Self::Warm
        }
    }
}

/// Dimensionless factor the sensor resistance is divided by to compensate for ambient conditions
pub fn correction_factor(ambient: AmbientConditions, coefficients: &CorrectionCoefficients) -> f64 {
    let AmbientConditions {
        temperature: t,
        humidity: h,
    } = ambient;
    let c = coefficients;

    match CorrectionBranch::for_temperature(t) {
        CorrectionBranch::Cold => c.a * t * t - c.b * t + c.c - (h - REFERENCE_HUMIDITY) * c.d,
        CorrectionBranch::Warm => c.e * t + c.f * h + c.g,
    }
}
