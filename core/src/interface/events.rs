use crate::interface::hazard::{Hazard, HazardKind};
use serde::{Deserialize, Serialize};

/// Kinematic report for one vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeReport {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub timestamp: f64,
}

impl NodeReport {
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.heading.is_finite()
    }
}

/// Events delivered to the core by the host transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundEvent {
    PositionUpdate(NodeReport),
    SensorRequest {
        vname: String,
    },
    SensorClear {
        vname: String,
    },
    ClassifyRequest {
        vname: String,
        label: String,
    },
    /// `source` is the community the message arrived from; it must name
    /// the vehicle being configured.
    ConfigRequest {
        source: String,
        vname: String,
        width: f64,
        pd: f64,
    },
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::PositionUpdate(_) => "position_update",
            InboundEvent::SensorRequest { .. } => "sensor_request",
            InboundEvent::SensorClear { .. } => "sensor_clear",
            InboundEvent::ClassifyRequest { .. } => "classify_request",
            InboundEvent::ConfigRequest { .. } => "config_request",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionReport {
    pub vname: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub resemblance: f64,
    pub kind: HazardKind,
}

impl DetectionReport {
    pub fn new(vname: &str, hazard: &Hazard) -> Self {
        Self {
            vname: vname.to_string(),
            label: hazard.label.clone(),
            x: hazard.x,
            y: hazard.y,
            resemblance: hazard.resemblance,
            kind: hazard.kind,
        }
    }
}

/// Classification result. `reported_kind` may differ from ground truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationReport {
    pub vname: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub resemblance: f64,
    pub reported_kind: HazardKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigAck {
    pub vname: String,
    pub width: f64,
    pub pd: f64,
    pub pfa: f64,
    pub pclass: f64,
}

impl ConfigAck {
    /// Wire rendering: width to one decimal, probabilities to three.
    pub fn to_spec(&self) -> String {
        format!(
            "vname={},width={:.1},pd={:.3},pfa={:.3},pclass={:.3}",
            self.vname, self.width, self.pd, self.pfa, self.pclass
        )
    }
}

/// Events the core hands back to the host transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Broadcast detection report carrying the requesting vehicle's name.
    Detection(DetectionReport),
    /// The same detection addressed to the requesting vehicle.
    VehicleDetection(DetectionReport),
    Classification(ClassificationReport),
    ConfigAck(ConfigAck),
    OptionsSummary { summary: String },
}

impl OutboundEvent {
    /// Vehicle the event is addressed to, if any.
    pub fn recipient(&self) -> Option<&str> {
        match self {
            OutboundEvent::VehicleDetection(report) => Some(&report.vname),
            OutboundEvent::Classification(report) => Some(&report.vname),
            OutboundEvent::ConfigAck(ack) => Some(&ack.vname),
            OutboundEvent::Detection(_) | OutboundEvent::OptionsSummary { .. } => None,
        }
    }
}
