#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

pub mod calibration;
pub mod concentration;
pub mod config;
pub mod correction;
pub mod error;
pub mod math;
pub mod reading;
pub mod resistance;
pub mod sensor;

pub use config::{SensorConfig, SharedConfig};
pub use error::Error;
pub use reading::{AmbientConditions, RawReading};
pub use sensor::{AmbientSource, GasSensor, RawSource, Report};

pub type Result<T> = ::std::result::Result<T, Error>;
