pub use crate::config::SensorConfig;
pub use crate::interface::{HazardKind, InboundEvent, OutboundEvent};
pub use crate::sensor::SensorCore;

/// Common error type for every recoverable failure in the sensor core.
///
/// Nothing here is fatal: the caller logs the error and the single
/// directive or request that produced it has no effect.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("malformed spec: {0}")]
    MalformedSpec(String),
    #[error("duplicated hazard label detected: {0}")]
    DuplicateLabel(String),
    #[error("unknown hazard label: {0}")]
    UnknownHazard(String),
    #[error("no node report received for {0}")]
    UnknownVehicle(String),
    #[error("request with null vehicle name")]
    MissingVehicleName,
    #[error("request with null hazard label")]
    MissingHazardLabel,
    #[error("bad sensor config request from: {vname} src: {source_name}")]
    ConfigMismatch { vname: String, source_name: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no sensor properties configured")]
    NoProfilesConfigured,
    #[error("every sensor setting is at capacity for: {0}")]
    ProfilesSaturated(String),
    #[error("no sensor setting for: {0}")]
    NoSensorSetting(String),
    #[error("sensor reset denied (too soon) for vehicle: {0}")]
    ResetTooSoon(String),
    #[error("sensor classify request saturated: {0}")]
    QuerySaturated(String),
    #[error("error reading hazard file {path}: {reason}")]
    HazardFile { path: String, reason: String },
}

pub type SensorResult<T> = Result<T, SensorError>;

/// Source of the shared detection/classification draw stream.
///
/// Every roll in the core pulls one integer from `0..DICE_SIDES`.
pub trait RandomSource {
    fn draw(&mut self) -> u32;
}

/// Number of faces on the simulated dice.
pub const DICE_SIDES: u32 = 10_000;

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn draw(&mut self) -> u32 {
        (**self).draw()
    }
}
