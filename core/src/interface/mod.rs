pub mod events;
pub mod hazard;
pub mod operating_point;

pub use events::{
    ClassificationReport, ConfigAck, DetectionReport, InboundEvent, NodeReport, OutboundEvent,
};
pub use hazard::{Hazard, HazardKind, HazardSpec};
pub use operating_point::OperatingPoint;
