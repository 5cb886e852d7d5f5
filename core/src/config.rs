use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Noise model applied to reported positions. Carried through the
/// configuration but not consumed by the detection math.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum NoiseModel {
    Uniform {
        #[serde(default)]
        pct: f64,
    },
}

impl NoiseModel {
    pub fn normalized(self) -> Self {
        match self {
            NoiseModel::Uniform { pct } => NoiseModel::Uniform {
                pct: pct.clamp(0.0, 1.0),
            },
        }
    }
}

/// Typed configuration surface handed to the core by its host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// Seconds a vehicle must wait between sensor resets.
    pub min_reset_interval: f64,
    /// Seconds between operating-point summaries.
    pub options_summary_interval: f64,
    pub swath_length: f64,
    /// Seed the draw stream from entropy. When false, `seed` is used.
    pub seed_random: bool,
    pub seed: u64,
    pub rn_algorithm: Option<NoiseModel>,
    /// Operating points as `width=W,exp=E,class=C[,max=N]`.
    pub sensor_configs: Vec<String>,
    /// Inline hazard specs as `x=..,y=..,type=..[,label=..][,hr=..]`.
    pub hazards: Vec<String>,
    pub hazard_file: Option<PathBuf>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            min_reset_interval: 300.0,
            options_summary_interval: 10.0,
            swath_length: 5.0,
            seed_random: true,
            seed: 0,
            rn_algorithm: None,
            sensor_configs: Vec::new(),
            hazards: Vec::new(),
            hazard_file: None,
        }
    }
}

impl SensorConfig {
    pub fn normalized_swath_length(&self) -> f64 {
        if self.swath_length.is_finite() {
            self.swath_length.max(1.0)
        } else {
            1.0
        }
    }

    pub fn normalized_summary_interval(&self) -> f64 {
        if self.options_summary_interval.is_finite() {
            self.options_summary_interval.clamp(0.0, 120.0)
        } else {
            0.0
        }
    }

    pub fn normalized_reset_interval(&self) -> f64 {
        if self.min_reset_interval.is_finite() {
            self.min_reset_interval.max(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_field_settings() {
        let config = SensorConfig::default();
        assert_eq!(config.min_reset_interval, 300.0);
        assert_eq!(config.options_summary_interval, 10.0);
        assert!(config.seed_random);
    }

    #[test]
    fn out_of_range_values_are_normalized() {
        let config = SensorConfig {
            swath_length: 0.2,
            options_summary_interval: 500.0,
            min_reset_interval: -3.0,
            ..Default::default()
        };
        assert_eq!(config.normalized_swath_length(), 1.0);
        assert_eq!(config.normalized_summary_interval(), 120.0);
        assert_eq!(config.normalized_reset_interval(), 0.0);
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let json = r#"{
            "swath_length": 10,
            "rn_algorithm": {"algorithm": "uniform", "pct": 4.0},
            "sensor_configs": ["width=10,exp=2,class=0.8"],
            "default_hazard_color": "green"
        }"#;
        let config: SensorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.swath_length, 10.0);
        assert_eq!(config.min_reset_interval, 300.0);
        assert_eq!(config.sensor_configs.len(), 1);
        assert_eq!(
            config.rn_algorithm.map(NoiseModel::normalized),
            Some(NoiseModel::Uniform { pct: 1.0 })
        );
    }
}
