//! Core of the simulated hazard-detection sensor.
//!
//! Vehicles report their pose, ask for sensor sweeps and classification
//! passes, and negotiate one of a small set of discrete sensor operating
//! points. The core answers with detection, classification and
//! configuration reports rolled against the configured ROC curves.

pub mod config;
pub mod interface;
pub mod math;
pub mod prelude;
pub mod sensor;
pub mod telemetry;

pub use prelude::{RandomSource, SensorError, SensorResult};
