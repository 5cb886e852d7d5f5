use crate::interface::ConfigAck;
use crate::prelude::{SensorError, SensorResult};
use crate::sensor::profile::SensorProfileTable;
use crate::telemetry::VehicleStatus;
use std::collections::BTreeMap;

/// Pd used when a vehicle starts sensing without asking for a setting.
pub const GUESSED_PD: f64 = 0.9;

/// Operating point committed to one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSetting {
    pub width: f64,
    pub exponent: f64,
    pub pd: f64,
    /// `pd ^ exponent`, fixed when the setting is committed.
    pub pfa: f64,
    pub pclass: f64,
}

/// Everything the core tracks about one vehicle's sensor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleSensorAssignment {
    pub setting: Option<SensorSetting>,
    pub last_reset: Option<f64>,
    pub resets: u32,
    pub requests: u32,
    pub detections: u32,
    pub classifications: u32,
}

impl VehicleSensorAssignment {
    fn reset_allowed(&self, now: f64, min_reset_interval: f64) -> bool {
        match self.last_reset {
            Some(last) => now - last >= min_reset_interval,
            None => true,
        }
    }
}

/// One record per vehicle name.
#[derive(Debug, Clone, Default)]
pub struct AssignmentTable {
    vehicles: BTreeMap<String, VehicleSensorAssignment>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, vname: &str) -> Option<&VehicleSensorAssignment> {
        self.vehicles.get(vname)
    }

    pub fn entry(&mut self, vname: &str) -> &mut VehicleSensorAssignment {
        self.vehicles.entry(vname.to_string()).or_default()
    }

    pub fn setting(&self, vname: &str) -> Option<SensorSetting> {
        self.vehicles.get(vname).and_then(|a| a.setting)
    }

    /// Number of vehicles other than `vname` currently holding `width`.
    pub fn holders_of(&self, width: f64, vname: &str) -> usize {
        self.vehicles
            .iter()
            .filter(|(name, assignment)| {
                name.as_str() != vname
                    && assignment.setting.map_or(false, |s| s.width == width)
            })
            .count()
    }

    /// Fits a requested width/Pd to the profile table and commits it.
    ///
    /// Fails without touching the prior setting when the table is empty,
    /// when the previous reset is younger than `min_reset_interval`, or
    /// when every operating point is at capacity.
    pub fn commit(
        &mut self,
        profiles: &SensorProfileTable,
        vname: &str,
        width: f64,
        pd: f64,
        now: f64,
        min_reset_interval: f64,
    ) -> SensorResult<ConfigAck> {
        if profiles.is_empty() {
            return Err(SensorError::NoProfilesConfigured);
        }

        let width = width.max(0.0);
        let pd = pd.clamp(0.0, 1.0);

        if let Some(existing) = self.vehicles.get(vname) {
            if !existing.reset_allowed(now, min_reset_interval) {
                return Err(SensorError::ResetTooSoon(vname.to_string()));
            }
        }

        let index = profiles.select_operating_point(width, vname, self)?;
        let point = *profiles
            .get(index)
            .ok_or(SensorError::NoProfilesConfigured)?;

        let setting = SensorSetting {
            width: point.width,
            exponent: point.exponent,
            pd,
            pfa: point.false_alarm_probability(pd),
            pclass: point.class_accuracy,
        };

        let assignment = self.entry(vname);
        assignment.setting = Some(setting);
        assignment.resets += 1;
        assignment.last_reset = Some(now);

        Ok(ConfigAck {
            vname: vname.to_string(),
            width: setting.width,
            pd: setting.pd,
            pfa: setting.pfa,
            pclass: setting.pclass,
        })
    }

    /// Default setting for a vehicle that never asked for one: the
    /// midpoint width and [`GUESSED_PD`].
    pub fn commit_guess(
        &mut self,
        profiles: &SensorProfileTable,
        vname: &str,
        now: f64,
        min_reset_interval: f64,
    ) -> SensorResult<ConfigAck> {
        let width = profiles
            .midpoint_width()
            .ok_or(SensorError::NoProfilesConfigured)?;
        self.commit(profiles, vname, width, GUESSED_PD, now, min_reset_interval)
    }

    pub fn statuses(&self) -> Vec<VehicleStatus> {
        self.vehicles
            .iter()
            .map(|(vname, assignment)| VehicleStatus {
                vname: vname.clone(),
                width: assignment.setting.map(|s| s.width),
                pd: assignment.setting.map(|s| s.pd),
                pfa: assignment.setting.map(|s| s.pfa),
                pclass: assignment.setting.map(|s| s.pclass),
                resets: assignment.resets,
                last_reset: assignment.last_reset,
                requests: assignment.requests,
                detections: assignment.detections,
                classifications: assignment.classifications,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> SensorProfileTable {
        let mut table = SensorProfileTable::new();
        table.add_operating_point(10.0, 2.0, 0.8, 0);
        table.add_operating_point(25.0, 4.0, 0.93, 0);
        table
    }

    #[test]
    fn commit_derives_pfa_from_roc_curve() {
        let mut table = AssignmentTable::new();
        let ack = table.commit(&profiles(), "alpha", 12.0, 0.9, 0.0, 300.0).unwrap();
        assert_eq!(ack.width, 10.0);
        assert_eq!(ack.pfa, 0.9_f64.powf(2.0));
        assert_eq!(ack.pclass, 0.8);
        assert_eq!(table.get("alpha").map(|a| a.resets), Some(1));
    }

    #[test]
    fn reset_interval_is_enforced() {
        let profiles = profiles();
        let mut table = AssignmentTable::new();
        table.commit(&profiles, "alpha", 10.0, 0.9, 100.0, 300.0).unwrap();

        let denied = table.commit(&profiles, "alpha", 25.0, 0.5, 399.0, 300.0);
        assert_eq!(denied, Err(SensorError::ResetTooSoon("alpha".into())));
        let setting = table.setting("alpha").unwrap();
        assert_eq!(setting.width, 10.0);
        assert_eq!(setting.pd, 0.9);

        let ack = table.commit(&profiles, "alpha", 25.0, 0.5, 400.0, 300.0).unwrap();
        assert_eq!(ack.width, 25.0);
        assert_eq!(ack.pfa, 0.5_f64.powf(4.0));
        assert_eq!(table.get("alpha").and_then(|a| a.last_reset), Some(400.0));
    }

    #[test]
    fn inputs_are_clamped() {
        let mut table = AssignmentTable::new();
        let ack = table.commit(&profiles(), "alpha", -40.0, 1.7, 0.0, 0.0).unwrap();
        assert_eq!(ack.width, 10.0);
        assert_eq!(ack.pd, 1.0);
    }

    #[test]
    fn guess_uses_midpoint_and_default_pd() {
        let mut table = AssignmentTable::new();
        let ack = table.commit_guess(&profiles(), "alpha", 0.0, 300.0).unwrap();
        // midpoint 17.5 is equidistant; the narrower point wins
        assert_eq!(ack.width, 10.0);
        assert_eq!(ack.pd, GUESSED_PD);
    }

    #[test]
    fn empty_profiles_leave_vehicle_unassigned() {
        let mut table = AssignmentTable::new();
        let result = table.commit_guess(&SensorProfileTable::new(), "alpha", 0.0, 300.0);
        assert_eq!(result, Err(SensorError::NoProfilesConfigured));
        assert_eq!(table.setting("alpha"), None);
    }

    #[test]
    fn holders_ignore_requesting_vehicle_and_unassigned_records() {
        let profiles = profiles();
        let mut table = AssignmentTable::new();
        table.commit(&profiles, "alpha", 10.0, 0.9, 0.0, 0.0).unwrap();
        table.commit(&profiles, "bravo", 10.0, 0.9, 0.0, 0.0).unwrap();
        table.entry("charlie").requests += 1;
        assert_eq!(table.holders_of(10.0, "alpha"), 1);
        assert_eq!(table.holders_of(10.0, "charlie"), 2);
        assert_eq!(table.holders_of(25.0, "charlie"), 0);
    }
}
