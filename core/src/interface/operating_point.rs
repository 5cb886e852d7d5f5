use crate::interface::hazard::{parse_number, parse_pairs};
use crate::prelude::{SensorError, SensorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One discrete sensor configuration a vehicle may be assigned.
///
/// Choosing the width also chooses the ROC curve `Pfa = Pd ^ exponent`
/// and the classifier accuracy that goes with it. `capacity` bounds how
/// many vehicles may hold this width at once; zero means unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OperatingPoint {
    pub width: f64,
    pub exponent: f64,
    pub class_accuracy: f64,
    pub capacity: u32,
}

impl OperatingPoint {
    /// Builds a point with every parameter clamped into its valid range.
    pub fn clamped(width: f64, exponent: f64, class_accuracy: f64, capacity: i64) -> Self {
        Self {
            width: width.max(0.0),
            exponent: exponent.max(1.0),
            class_accuracy: class_accuracy.clamp(0.0, 1.0),
            capacity: capacity.clamp(0, u32::MAX as i64) as u32,
        }
    }

    pub fn false_alarm_probability(&self, pd: f64) -> f64 {
        pd.powf(self.exponent)
    }
}

impl fmt::Display for OperatingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "width={},exp={},class={}",
            self.width, self.exponent, self.class_accuracy
        )?;
        if self.capacity > 0 {
            write!(f, ",max={}", self.capacity)?;
        }
        Ok(())
    }
}

impl FromStr for OperatingPoint {
    type Err = SensorError;

    /// Parses `width=25,exp=4,class=0.8[,max=2]`.
    fn from_str(line: &str) -> SensorResult<Self> {
        let mut width = None;
        let mut exponent = None;
        let mut class_accuracy = None;
        let mut capacity = 0_i64;

        for (key, value) in parse_pairs(line) {
            match key.as_str() {
                "width" => width = Some(parse_number(&key, &value)?),
                "exp" => exponent = Some(parse_number(&key, &value)?),
                "class" | "pclass" => class_accuracy = Some(parse_number(&key, &value)?),
                "max" => capacity = parse_number(&key, &value)? as i64,
                _ => {}
            }
        }

        Ok(OperatingPoint::clamped(
            width.ok_or(SensorError::MissingField("width"))?,
            exponent.ok_or(SensorError::MissingField("exp"))?,
            class_accuracy.ok_or(SensorError::MissingField("class"))?,
            capacity,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_clamps_operating_point() {
        let point: OperatingPoint = "width=-5,exp=0.5,pclass=1.4,max=-2".parse().unwrap();
        assert_eq!(point.width, 0.0);
        assert_eq!(point.exponent, 1.0);
        assert_eq!(point.class_accuracy, 1.0);
        assert_eq!(point.capacity, 0);
    }

    #[test]
    fn missing_exponent_is_rejected() {
        assert_eq!(
            "width=10,class=0.8".parse::<OperatingPoint>(),
            Err(SensorError::MissingField("exp"))
        );
    }

    #[test]
    fn display_matches_summary_format() {
        let unlimited = OperatingPoint::clamped(25.0, 4.0, 0.8, 0);
        assert_eq!(unlimited.to_string(), "width=25,exp=4,class=0.8");
        let limited = OperatingPoint::clamped(10.0, 8.0, 0.93, 2);
        assert_eq!(limited.to_string(), "width=10,exp=8,class=0.93,max=2");
    }

    #[test]
    fn roc_curve_relation() {
        let point = OperatingPoint::clamped(10.0, 2.0, 0.8, 0);
        assert!((point.false_alarm_probability(0.9) - 0.81).abs() < 1e-12);
    }
}
