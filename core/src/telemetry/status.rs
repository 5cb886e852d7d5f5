use crate::interface::OperatingPoint;
use crate::telemetry::metrics::MetricsSnapshot;
use serde::Serialize;
use std::collections::BTreeMap;

/// Sensor settings and lifetime counters for one known vehicle.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VehicleStatus {
    pub vname: String,
    pub width: Option<f64>,
    pub pd: Option<f64>,
    pub pfa: Option<f64>,
    pub pclass: Option<f64>,
    pub resets: u32,
    pub last_reset: Option<f64>,
    pub requests: u32,
    pub detections: u32,
    pub classifications: u32,
}

/// Point-in-time view of the whole sensor core.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SensorStatus {
    pub time: f64,
    pub hazard_file: Option<String>,
    pub hazard_count: usize,
    pub benign_count: usize,
    pub operating_points: Vec<OperatingPoint>,
    pub vehicles: Vec<VehicleStatus>,
    pub metrics: MetricsSnapshot,
    pub run_warnings: BTreeMap<String, u32>,
    pub config_warnings: Vec<String>,
}

impl SensorStatus {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
