use hazardcore::interface::OutboundEvent;
use serde::{Deserialize, Serialize};

/// Body of `POST /tick`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TickRequest {
    pub now: f64,
}

/// Outbound traffic seen by the bridge since it started.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BridgeModel {
    pub time: f64,
    pub detection_count: usize,
    pub classification_count: usize,
    pub last_events: Vec<OutboundEvent>,
}

impl BridgeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: f64, events: &[OutboundEvent]) {
        self.time = time;
        for event in events {
            match event {
                OutboundEvent::VehicleDetection(_) => self.detection_count += 1,
                OutboundEvent::Classification(_) => self.classification_count += 1,
                _ => {}
            }
        }
        if !events.is_empty() {
            self.last_events = events.to_vec();
        }
    }
}
