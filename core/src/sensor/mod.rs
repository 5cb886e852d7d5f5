pub mod assignment;
pub mod catalog;
pub mod classify;
pub mod detection;
pub mod engine;
pub mod profile;
pub mod tracks;

pub use assignment::{AssignmentTable, SensorSetting, VehicleSensorAssignment};
pub use catalog::{HazardCatalog, HazardFileSummary};
pub use classify::{ClassificationModel, HitLedger};
pub use detection::{ContainmentState, DetectionStateMachine};
pub use engine::SensorCore;
pub use profile::SensorProfileTable;
pub use tracks::{VehicleTrack, VehicleTrackTable};
