use crate::interface::{Hazard, HazardKind};
use crate::math::dice::threshold;
use crate::math::geometry::Polygon;
use crate::prelude::RandomSource;
use crate::sensor::assignment::SensorSetting;
use crate::sensor::catalog::HazardCatalog;
use std::collections::HashMap;

/// Whether a hazard sits inside a vehicle's swath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainmentState {
    #[default]
    Outside,
    Inside,
}

impl From<bool> for ContainmentState {
    fn from(contained: bool) -> Self {
        if contained {
            ContainmentState::Inside
        } else {
            ContainmentState::Outside
        }
    }
}

/// Draw threshold for a detection roll against `hazard`.
///
/// True hazards pass with `pd`. Benign objects pass with the mean of the
/// false-alarm probability and their resemblance, or always when
/// `pfa >= 1`.
pub fn detection_threshold(hazard: &Hazard, setting: &SensorSetting) -> u32 {
    match hazard.kind {
        HazardKind::Hazard => threshold(setting.pd),
        HazardKind::Benign => {
            let coefficient = if setting.pfa < 1.0 {
                (setting.pfa + hazard.resemblance) / 2.0
            } else {
                1.0
            };
            threshold(coefficient)
        }
    }
}

pub fn roll_detection<R: RandomSource + ?Sized>(
    dice: &mut R,
    hazard: &Hazard,
    setting: &SensorSetting,
) -> bool {
    dice.draw() < detection_threshold(hazard, setting)
}

/// Edge-triggered detection per (vehicle, hazard) pair.
///
/// Only an `Outside -> Inside` transition rolls the dice; a hazard has to
/// leave the swath and come back before it can be detected again.
#[derive(Debug, Default)]
pub struct DetectionStateMachine {
    status: HashMap<(String, String), ContainmentState>,
}

impl DetectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, vname: &str, label: &str) -> ContainmentState {
        self.status
            .get(&(vname.to_string(), label.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Records the new containment and returns true on a rising edge.
    pub fn observe(&mut self, vname: &str, label: &str, contained: bool) -> bool {
        let next = ContainmentState::from(contained);
        let previous = self
            .status
            .insert((vname.to_string(), label.to_string()), next)
            .unwrap_or_default();
        previous == ContainmentState::Outside && next == ContainmentState::Inside
    }

    /// Re-evaluates every catalog object against `polygon` in label order
    /// and returns the labels whose detection roll succeeded.
    pub fn sweep<R: RandomSource + ?Sized>(
        &mut self,
        vname: &str,
        polygon: &Polygon,
        catalog: &HazardCatalog,
        setting: &SensorSetting,
        dice: &mut R,
    ) -> Vec<String> {
        let mut detected = Vec::new();
        for hazard in catalog.iter() {
            let contained = polygon.contains(hazard.x, hazard.y);
            let entered = self.observe(vname, &hazard.label, contained);
            if entered && roll_detection(dice, hazard, setting) {
                detected.push(hazard.label.clone());
            }
        }
        detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::dice::ScriptedDice;
    use crate::math::geometry::build_swath_polygon;

    fn setting(pd: f64, pfa: f64) -> SensorSetting {
        SensorSetting {
            width: 50.0,
            exponent: 2.0,
            pd,
            pfa,
            pclass: 0.8,
        }
    }

    fn hazard(label: &str, x: f64, y: f64, kind: HazardKind, resemblance: f64) -> Hazard {
        Hazard {
            label: label.into(),
            x,
            y,
            kind,
            resemblance,
            color: None,
            shape: None,
            width: None,
        }
    }

    #[test]
    fn thresholds_follow_object_type() {
        let s = setting(0.9, 0.75);
        assert_eq!(detection_threshold(&hazard("h", 0.0, 0.0, HazardKind::Hazard, 1.0), &s), 9001);
        // (0.75 + 0.25) / 2 = 0.5
        assert_eq!(detection_threshold(&hazard("b", 0.0, 0.0, HazardKind::Benign, 0.25), &s), 5001);
        let certain = setting(1.0, 1.0);
        assert_eq!(
            detection_threshold(&hazard("b", 0.0, 0.0, HazardKind::Benign, 0.0), &certain),
            10_001
        );
    }

    #[test]
    fn only_rising_edges_fire() {
        let mut machine = DetectionStateMachine::new();
        assert!(!machine.observe("alpha", "1", false));
        assert!(machine.observe("alpha", "1", true));
        assert!(!machine.observe("alpha", "1", true));
        assert!(!machine.observe("alpha", "1", false));
        assert!(machine.observe("alpha", "1", true));
        assert_eq!(machine.state("alpha", "1"), ContainmentState::Inside);
        assert_eq!(machine.state("bravo", "1"), ContainmentState::Outside);
    }

    #[test]
    fn sustained_containment_never_rerolls() {
        let mut catalog = HazardCatalog::new();
        catalog.add_hazard("x=0,y=5,type=hazard,label=a").unwrap();
        let polygon = build_swath_polygon(0.0, 0.0, 0.0, 50.0, 10.0);
        let s = setting(0.9, 0.81);
        let mut dice = ScriptedDice::new([9500, 0, 0]);
        let mut machine = DetectionStateMachine::new();

        // first entry: draw 9500 misses the 9001 threshold
        assert!(machine.sweep("alpha", &polygon, &catalog, &s, &mut dice).is_empty());
        // still inside: no further draws are consumed
        assert!(machine.sweep("alpha", &polygon, &catalog, &s, &mut dice).is_empty());
        assert!(machine.sweep("alpha", &polygon, &catalog, &s, &mut dice).is_empty());
        assert_eq!(dice.remaining(), 2);
    }

    #[test]
    fn sweep_reports_in_label_order() {
        let mut catalog = HazardCatalog::new();
        catalog.add_hazard("x=10,y=0,type=hazard,label=b").unwrap();
        catalog.add_hazard("x=-10,y=0,type=benign,label=a,hr=1").unwrap();
        catalog.add_hazard("x=0,y=500,type=hazard,label=c").unwrap();
        let polygon = build_swath_polygon(0.0, 0.0, 0.0, 50.0, 10.0);
        let mut dice = ScriptedDice::constant(0);
        let mut machine = DetectionStateMachine::new();

        let detected = machine.sweep("alpha", &polygon, &catalog, &setting(0.9, 0.81), &mut dice);
        assert_eq!(detected, vec!["a".to_string(), "b".to_string()]);
    }
}
