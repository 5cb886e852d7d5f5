use hazardcore::interface::NodeReport;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating a synthetic field laydown and patrol plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub vehicles: usize,
    pub hazards: usize,
    /// Side of the square field, centred on the origin.
    pub field_size: f64,
    /// Share of generated objects that are benign decoys.
    pub benign_ratio: f64,
    /// Vehicle speed along its lane, in metres per second.
    pub speed: f64,
    pub seed: u64,
    pub description: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            vehicles: 2,
            hazards: 40,
            field_size: 400.0,
            benign_ratio: 0.5,
            speed: 2.0,
            seed: 0,
            description: None,
        }
    }
}

impl ScenarioConfig {
    fn normalized_vehicles(&self) -> usize {
        self.vehicles.max(1)
    }

    fn normalized_field(&self) -> f64 {
        if self.field_size.is_finite() {
            self.field_size.max(1.0)
        } else {
            1.0
        }
    }

    pub fn vehicle_names(&self) -> Vec<String> {
        (0..self.normalized_vehicles())
            .map(|index| format!("v{}", index + 1))
            .collect()
    }
}

/// Scatters hazards and decoys uniformly over the field and returns them as
/// `x=..,y=..,type=..,label=..,hr=..` specs.
pub fn build_hazard_specs(config: &ScenarioConfig) -> Vec<String> {
    let half = config.normalized_field() / 2.0;
    let benign_ratio = config.benign_ratio.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(config.seed);

    (0..config.hazards)
        .map(|index| {
            let x = rng.gen_range(-half..half);
            let y = rng.gen_range(-half..half);
            let benign = rng.gen_bool(benign_ratio);
            let (kind, resemblance) = if benign {
                ("benign", rng.gen_range(0.0..1.0))
            } else {
                ("hazard", 1.0)
            };
            format!(
                "x={:.1},y={:.1},type={},label=h{:03},hr={:.2}",
                x, y, kind, index, resemblance
            )
        })
        .collect()
}

/// Pose of vehicle `index` at time `t`.
///
/// Each vehicle owns a north-south lane and sweeps it end to end, turning
/// around at the field edge.
pub fn patrol_report(config: &ScenarioConfig, index: usize, name: &str, t: f64) -> NodeReport {
    let field = config.normalized_field();
    let half = field / 2.0;
    let lanes = config.normalized_vehicles() as f64;
    let lane_width = field / lanes;
    let x = -half + (index as f64 + 0.5) * lane_width;

    let travelled = (config.speed.max(0.0) * t.max(0.0)) % (2.0 * field);
    let (y, heading) = if travelled < field {
        (-half + travelled, 0.0)
    } else {
        (half - (travelled - field), 180.0)
    };

    NodeReport {
        name: name.to_string(),
        x,
        y,
        heading,
        timestamp: t,
    }
}
