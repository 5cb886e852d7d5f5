use crate::interface::NodeReport;
use crate::math::geometry::{build_swath_polygon, Polygon};
use crate::prelude::{SensorError, SensorResult};
use crate::sensor::assignment::AssignmentTable;
use std::collections::BTreeMap;

/// Last known pose of a vehicle and its current sensor footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleTrack {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    /// Timestamp of the first report. Later reports replace the pose
    /// but carry this value forward.
    pub timestamp: f64,
    pub polygon: Polygon,
}

#[derive(Debug, Clone, Default)]
pub struct VehicleTrackTable {
    tracks: BTreeMap<String, VehicleTrack>,
}

impl VehicleTrackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the track for `report.name`. Returns true when
    /// the vehicle was not known before.
    pub fn upsert(&mut self, report: &NodeReport) -> bool {
        match self.tracks.get_mut(&report.name) {
            Some(track) => {
                track.x = report.x;
                track.y = report.y;
                track.heading = report.heading;
                false
            }
            None => {
                self.tracks.insert(
                    report.name.clone(),
                    VehicleTrack {
                        name: report.name.clone(),
                        x: report.x,
                        y: report.y,
                        heading: report.heading,
                        timestamp: report.timestamp,
                        polygon: Polygon::default(),
                    },
                );
                true
            }
        }
    }

    /// Recomputes the swath polygon from the vehicle's pose and its
    /// assigned width.
    pub fn rebuild_polygon(
        &mut self,
        name: &str,
        assignments: &AssignmentTable,
        swath_length: f64,
    ) -> SensorResult<&Polygon> {
        let setting = assignments
            .setting(name)
            .ok_or_else(|| SensorError::NoSensorSetting(name.to_string()))?;
        let track = self
            .tracks
            .get_mut(name)
            .ok_or_else(|| SensorError::UnknownVehicle(name.to_string()))?;

        track.polygon =
            build_swath_polygon(track.x, track.y, track.heading, setting.width, swath_length);
        Ok(&track.polygon)
    }

    pub fn get(&self, name: &str) -> Option<&VehicleTrack> {
        self.tracks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tracks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::profile::SensorProfileTable;

    fn report(name: &str, x: f64, y: f64, heading: f64, timestamp: f64) -> NodeReport {
        NodeReport {
            name: name.into(),
            x,
            y,
            heading,
            timestamp,
        }
    }

    #[test]
    fn upsert_replaces_pose_and_keeps_first_timestamp() {
        let mut tracks = VehicleTrackTable::new();
        assert!(tracks.upsert(&report("alpha", 0.0, 0.0, 0.0, 10.0)));
        assert!(!tracks.upsert(&report("alpha", 5.0, 6.0, 90.0, 20.0)));

        let track = tracks.get("alpha").unwrap();
        assert_eq!((track.x, track.y, track.heading), (5.0, 6.0, 90.0));
        assert_eq!(track.timestamp, 10.0);
        assert!(track.polygon.is_empty());
    }

    #[test]
    fn rebuild_requires_sensor_setting() {
        let mut tracks = VehicleTrackTable::new();
        tracks.upsert(&report("alpha", 0.0, 0.0, 0.0, 0.0));
        let assignments = AssignmentTable::new();
        assert_eq!(
            tracks.rebuild_polygon("alpha", &assignments, 10.0).map(|p| p.clone()),
            Err(SensorError::NoSensorSetting("alpha".into()))
        );
    }

    #[test]
    fn rebuild_follows_latest_pose() {
        let mut profiles = SensorProfileTable::new();
        profiles.add_operating_point(50.0, 2.0, 0.8, 0);
        let mut assignments = AssignmentTable::new();
        assignments
            .commit(&profiles, "alpha", 50.0, 0.9, 0.0, 0.0)
            .unwrap();

        let mut tracks = VehicleTrackTable::new();
        tracks.upsert(&report("alpha", 0.0, 0.0, 0.0, 0.0));
        let polygon = tracks.rebuild_polygon("alpha", &assignments, 10.0).unwrap();
        assert!(polygon.contains(0.0, 5.0));
        assert!(!polygon.contains(0.0, 500.0));

        tracks.upsert(&report("alpha", 0.0, 495.0, 0.0, 1.0));
        let polygon = tracks.rebuild_polygon("alpha", &assignments, 10.0).unwrap();
        assert!(polygon.contains(0.0, 500.0));
    }
}
