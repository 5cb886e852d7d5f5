use crate::generator::scenario::patrol_report;
use crate::workflow::config::WorkflowConfig;
use hazardcore::interface::{InboundEvent, OutboundEvent};
use hazardcore::prelude::SensorCore;
use hazardcore::telemetry::SensorStatus;
use log::{debug, info, warn};

pub struct WorkflowResult {
    pub events: Vec<OutboundEvent>,
    pub detection_count: usize,
    pub classification_count: usize,
    pub config_acks: usize,
    pub status: SensorStatus,
}

impl WorkflowResult {
    fn from_events(events: Vec<OutboundEvent>, status: SensorStatus) -> Self {
        let mut detection_count = 0;
        let mut classification_count = 0;
        let mut config_acks = 0;
        for event in &events {
            match event {
                OutboundEvent::VehicleDetection(_) => detection_count += 1,
                OutboundEvent::Classification(_) => classification_count += 1,
                OutboundEvent::ConfigAck(_) => config_acks += 1,
                _ => {}
            }
        }

        Self {
            events,
            detection_count,
            classification_count,
            config_acks,
            status,
        }
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Builds a fresh core for this workflow.
    pub fn build_core(&self) -> SensorCore {
        SensorCore::from_config(&self.config.to_sensor_config())
    }

    #[cfg(test)]
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let mut core = self.build_core();
        self.run(&mut core)
    }

    /// Drives `core` through the whole patrol. The core keeps its state
    /// afterwards so a host can keep serving it.
    pub fn run(&self, core: &mut SensorCore) -> anyhow::Result<WorkflowResult> {
        let status = core.status();
        if status.operating_points.is_empty() {
            anyhow::bail!("workflow has no usable sensor operating points");
        }
        for warning in &status.config_warnings {
            warn!("{}", warning);
        }

        let names = self.config.scenario.vehicle_names();
        let mut events = core.tick(0.0);
        for name in &names {
            events.extend(core.handle_event(InboundEvent::ConfigRequest {
                source: name.clone(),
                vname: name.clone(),
                width: self.config.requested_width,
                pd: self.config.requested_pd,
            }));
        }

        for step in 0..=self.config.step_count() {
            let now = step as f64 * self.config.time_step;
            events.extend(core.tick(now));

            for (index, name) in names.iter().enumerate() {
                let report = patrol_report(&self.config.scenario, index, name, now);
                core.handle_event(InboundEvent::PositionUpdate(report));

                let swept = core.handle_event(InboundEvent::SensorRequest {
                    vname: name.clone(),
                });
                let queries: Vec<InboundEvent> = swept
                    .iter()
                    .filter_map(|event| match event {
                        OutboundEvent::VehicleDetection(report) => {
                            Some(InboundEvent::ClassifyRequest {
                                vname: report.vname.clone(),
                                label: report.label.clone(),
                            })
                        }
                        _ => None,
                    })
                    .collect();
                events.extend(swept);

                for query in queries {
                    events.extend(core.handle_event(query));
                }
            }
            debug!("step {} at t={} -> {} events", step, now, events.len());
        }

        let result = WorkflowResult::from_events(events, core.status());
        info!(
            "workflow finished: {} detections, {} classifications",
            result.detection_count, result.classification_count
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(vehicles: usize, hazards: usize, duration: f64) -> WorkflowConfig {
        WorkflowConfig::from_args(vehicles, hazards, duration, Some(5))
    }

    #[test]
    fn runner_executes_workflow() {
        let cfg = seeded(2, 30, 200.0);
        let result = Runner::new(cfg).execute().unwrap();
        assert_eq!(result.config_acks, 2);
        assert_eq!(result.status.vehicles.len(), 2);
        assert!(result.classification_count <= result.detection_count);
        for vehicle in &result.status.vehicles {
            assert_eq!(vehicle.width, Some(25.0));
            assert_eq!(vehicle.requests, 201);
        }
        assert!(matches!(
            result.events.first(),
            Some(OutboundEvent::OptionsSummary { .. })
        ));
    }

    #[test]
    fn every_detection_is_classified_once() {
        let mut cfg = seeded(1, 0, 20.0);
        cfg.sensor.sensor_configs = vec!["width=50,exp=2,class=0.9".into()];
        cfg.sensor.hazards = vec![
            "x=0,y=-190,type=hazard,label=a".into(),
            "x=10,y=-170,type=benign,label=b,hr=1".into(),
        ];
        cfg.scenario.field_size = 400.0;
        cfg.scenario.speed = 2.0;
        cfg.requested_pd = 1.0;

        let result = Runner::new(cfg).execute().unwrap();
        assert_eq!(result.detection_count, 2);
        assert_eq!(result.classification_count, 2);
        assert_eq!(result.status.vehicles[0].classifications, 2);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let cfg = seeded(3, 50, 120.0);
        let first = Runner::new(cfg.clone()).execute().unwrap();
        let second = Runner::new(cfg).execute().unwrap();
        assert_eq!(first.events, second.events);
    }

    #[test]
    fn run_leaves_state_in_the_callers_core() {
        let runner = Runner::new(seeded(2, 20, 30.0));
        let mut core = runner.build_core();
        let result = runner.run(&mut core).unwrap();
        assert_eq!(core.status(), result.status);
        assert_eq!(core.now(), 30.0);
        assert_eq!(core.assignments().get("v1").map(|a| a.requests), Some(31));
    }

    #[test]
    fn runner_rejects_workflow_without_operating_points() {
        let mut cfg = seeded(1, 5, 10.0);
        cfg.sensor.sensor_configs = vec!["width=oops".into()];
        assert!(Runner::new(cfg).execute().is_err());
    }
}
