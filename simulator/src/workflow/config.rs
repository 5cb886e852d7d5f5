use crate::generator::scenario::{build_hazard_specs, ScenarioConfig};
use anyhow::Context;
use hazardcore::prelude::SensorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Operating points used when the workflow file names none.
pub const DEFAULT_OPERATING_POINTS: [&str; 3] = [
    "width=10,exp=2,class=0.8",
    "width=25,exp=4,class=0.93",
    "width=50,exp=6,class=0.95,max=1",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Simulated seconds to run.
    pub duration: f64,
    pub time_step: f64,
    /// Width and pd every vehicle asks for at start.
    pub requested_width: f64,
    pub requested_pd: f64,
    pub scenario: ScenarioConfig,
    pub sensor: SensorConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            duration: 300.0,
            time_step: 1.0,
            requested_width: 25.0,
            requested_pd: 0.9,
            scenario: ScenarioConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(vehicles: usize, hazards: usize, duration: f64, seed: Option<u64>) -> Self {
        let mut config = Self {
            duration,
            ..Default::default()
        };
        config.scenario.vehicles = vehicles;
        config.scenario.hazards = hazards;
        if let Some(seed) = seed {
            config.scenario.seed = seed;
            config.sensor.seed = seed;
            config.sensor.seed_random = false;
        }
        config
    }

    pub fn step_count(&self) -> usize {
        if !(self.time_step > 0.0) || !self.duration.is_finite() {
            return 0;
        }
        (self.duration.max(0.0) / self.time_step).floor() as usize
    }

    /// Sensor configuration handed to the core. Without operating points or
    /// a laydown of its own, the defaults and a generated field are used.
    pub fn to_sensor_config(&self) -> SensorConfig {
        let mut sensor = self.sensor.clone();
        if sensor.sensor_configs.is_empty() {
            sensor.sensor_configs = DEFAULT_OPERATING_POINTS
                .iter()
                .map(|spec| spec.to_string())
                .collect();
        }
        if sensor.hazards.is_empty() && sensor.hazard_file.is_none() {
            sensor.hazards = build_hazard_specs(&self.scenario);
        }
        sensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_sensor_config() {
        let cfg = WorkflowConfig::from_args(3, 12, 60.0, Some(7));
        assert_eq!(cfg.step_count(), 60);
        let sensor = cfg.to_sensor_config();
        assert_eq!(sensor.hazards.len(), 12);
        assert_eq!(sensor.sensor_configs.len(), DEFAULT_OPERATING_POINTS.len());
        assert!(!sensor.seed_random);
        assert_eq!(sensor.seed, 7);
    }

    #[test]
    fn explicit_laydown_is_kept() {
        let mut cfg = WorkflowConfig::from_args(1, 12, 10.0, None);
        cfg.sensor.hazards = vec!["x=0,y=0,type=hazard".into()];
        assert_eq!(cfg.to_sensor_config().hazards.len(), 1);
        assert!(cfg.to_sensor_config().seed_random);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"duration: 30\n\
              time_step: 0.5\n\
              scenario:\n  vehicles: 4\n  hazards: 8\n\
              sensor:\n  swath_length: 12\n  sensor_configs:\n    - width=20,exp=3,class=0.9\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.step_count(), 60);
        assert_eq!(cfg.scenario.vehicles, 4);
        assert_eq!(cfg.sensor.swath_length, 12.0);
        assert_eq!(cfg.requested_pd, 0.9);
        assert_eq!(cfg.to_sensor_config().sensor_configs.len(), 1);
    }

    #[test]
    fn config_load_reports_bad_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"duration: [not, a, number]\n").unwrap();
        let err = WorkflowConfig::load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("parsing workflow config"));
    }
}
