use crate::prelude::{SensorError, SensorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ground-truth class of a laid-down object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Hazard,
    Benign,
}

impl HazardKind {
    pub fn flipped(self) -> Self {
        match self {
            HazardKind::Hazard => HazardKind::Benign,
            HazardKind::Benign => HazardKind::Hazard,
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HazardKind::Hazard => f.write_str("hazard"),
            HazardKind::Benign => f.write_str("benign"),
        }
    }
}

impl FromStr for HazardKind {
    type Err = SensorError;

    fn from_str(value: &str) -> SensorResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hazard" => Ok(HazardKind::Hazard),
            "benign" => Ok(HazardKind::Benign),
            other => Err(SensorError::MalformedSpec(format!(
                "unknown object type `{}`",
                other
            ))),
        }
    }
}

/// One simulated object in the field laydown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hazard {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub kind: HazardKind,
    pub resemblance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl Hazard {
    pub fn is_hazard(&self) -> bool {
        self.kind == HazardKind::Hazard
    }
}

/// Parsed form of a `x=..,y=..,type=..` spec before a label is resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HazardSpec {
    pub label: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub kind: Option<HazardKind>,
    pub resemblance: Option<f64>,
    pub color: Option<String>,
    pub shape: Option<String>,
    pub width: Option<f64>,
}

/// Splits a `key=value,key=value` line into lower-cased keys and trimmed
/// values. Fragments without `=` are kept with an empty value.
pub fn parse_pairs(line: &str) -> Vec<(String, String)> {
    line.split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| match fragment.split_once('=') {
            Some((key, value)) => (key.trim().to_ascii_lowercase(), value.trim().to_string()),
            None => (fragment.to_ascii_lowercase(), String::new()),
        })
        .collect()
}

pub(crate) fn parse_number(key: &str, value: &str) -> SensorResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            SensorError::MalformedSpec(format!("`{}` is not a number: `{}`", key, value))
        })
}

impl FromStr for HazardSpec {
    type Err = SensorError;

    fn from_str(line: &str) -> SensorResult<Self> {
        let mut spec = HazardSpec::default();
        for (key, value) in parse_pairs(line) {
            match key.as_str() {
                "x" => spec.x = Some(parse_number(&key, &value)?),
                "y" => spec.y = Some(parse_number(&key, &value)?),
                "type" => spec.kind = Some(value.parse()?),
                "label" if !value.is_empty() => spec.label = Some(value),
                "hr" | "resemblance" => {
                    spec.resemblance = Some(parse_number(&key, &value)?.clamp(0.0, 1.0))
                }
                "color" if !value.is_empty() => spec.color = Some(value),
                "shape" if !value.is_empty() => spec.shape = Some(value),
                "width" => spec.width = Some(parse_number(&key, &value)?),
                _ => {}
            }
        }
        Ok(spec)
    }
}

impl HazardSpec {
    /// Resolves the spec into a hazard, using `fallback_label` when the
    /// spec carried none.
    pub fn into_hazard(self, fallback_label: impl FnOnce() -> String) -> SensorResult<Hazard> {
        let x = self.x.ok_or(SensorError::MissingField("x"))?;
        let y = self.y.ok_or(SensorError::MissingField("y"))?;
        let kind = self.kind.ok_or(SensorError::MissingField("type"))?;

        Ok(Hazard {
            label: self.label.unwrap_or_else(fallback_label),
            x,
            y,
            kind,
            resemblance: self.resemblance.unwrap_or(1.0),
            color: self.color,
            shape: self.shape,
            width: self.width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_parses_all_known_keys() {
        let spec: HazardSpec = "x=10, Y=-4.5,type=benign,label=a1,hr=0.4,color=red,shape=circle,width=6"
            .parse()
            .unwrap();
        assert_eq!(spec.x, Some(10.0));
        assert_eq!(spec.y, Some(-4.5));
        assert_eq!(spec.kind, Some(HazardKind::Benign));
        assert_eq!(spec.label.as_deref(), Some("a1"));
        assert_eq!(spec.resemblance, Some(0.4));
        assert_eq!(spec.color.as_deref(), Some("red"));
        assert_eq!(spec.width, Some(6.0));
    }

    #[test]
    fn missing_resemblance_defaults_to_one() {
        let spec: HazardSpec = "x=1,y=2,type=benign".parse().unwrap();
        let hazard = spec.into_hazard(|| "7".into()).unwrap();
        assert_eq!(hazard.resemblance, 1.0);
        assert_eq!(hazard.label, "7");
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        let spec: HazardSpec = "y=2,type=hazard".parse().unwrap();
        assert_eq!(
            spec.into_hazard(|| "0".into()),
            Err(SensorError::MissingField("x"))
        );
        let spec: HazardSpec = "x=1,y=2".parse().unwrap();
        assert_eq!(
            spec.into_hazard(|| "0".into()),
            Err(SensorError::MissingField("type"))
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            "x=abc,y=2,type=hazard".parse::<HazardSpec>(),
            Err(SensorError::MalformedSpec(_))
        ));
        assert!(matches!(
            "x=1,y=2,type=rock".parse::<HazardSpec>(),
            Err(SensorError::MalformedSpec(_))
        ));
    }

    #[test]
    fn resemblance_is_clamped() {
        let spec: HazardSpec = "x=1,y=2,type=benign,hr=3".parse().unwrap();
        assert_eq!(spec.resemblance, Some(1.0));
    }
}
