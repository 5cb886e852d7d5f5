use crate::config::{NoiseModel, SensorConfig};
use crate::interface::{
    ClassificationReport, DetectionReport, InboundEvent, NodeReport, OperatingPoint, OutboundEvent,
};
use crate::math::dice::SeededDice;
use crate::prelude::{RandomSource, SensorError, SensorResult};
use crate::sensor::assignment::AssignmentTable;
use crate::sensor::catalog::HazardCatalog;
use crate::sensor::classify::ClassificationModel;
use crate::sensor::detection::DetectionStateMachine;
use crate::sensor::profile::SensorProfileTable;
use crate::sensor::tracks::VehicleTrackTable;
use crate::telemetry::{LogManager, MetricsRecorder, SensorStatus};
use log::debug;

/// Single-threaded sensor simulator driven by a host loop.
///
/// The host calls [`SensorCore::tick`] once per scheduling period and
/// [`SensorCore::handle_event`] for every inbound event. Both return the
/// outbound events to publish. Nothing here blocks, and a rejected event
/// leaves state untouched apart from the warning it records.
pub struct SensorCore<R: RandomSource = SeededDice> {
    min_reset_interval: f64,
    summary_interval: f64,
    swath_length: f64,
    noise: Option<NoiseModel>,
    catalog: HazardCatalog,
    profiles: SensorProfileTable,
    tracks: VehicleTrackTable,
    assignments: AssignmentTable,
    detection: DetectionStateMachine,
    classifier: ClassificationModel,
    dice: R,
    logger: LogManager,
    metrics: MetricsRecorder,
    now: f64,
    last_summary: Option<f64>,
}

impl SensorCore<SeededDice> {
    /// Builds a core whose draw stream is seeded per `config.seed_random`.
    pub fn from_config(config: &SensorConfig) -> Self {
        let dice = if config.seed_random {
            SeededDice::from_entropy()
        } else {
            SeededDice::from_seed(config.seed)
        };
        Self::with_dice(config, dice)
    }
}

impl<R: RandomSource> SensorCore<R> {
    /// Builds a core around an injected draw stream. Bad directives in
    /// `config` are skipped and recorded as config warnings.
    pub fn with_dice(config: &SensorConfig, dice: R) -> Self {
        let mut core = Self {
            min_reset_interval: config.normalized_reset_interval(),
            summary_interval: config.normalized_summary_interval(),
            swath_length: config.normalized_swath_length(),
            noise: config.rn_algorithm.map(NoiseModel::normalized),
            catalog: HazardCatalog::new(),
            profiles: SensorProfileTable::new(),
            tracks: VehicleTrackTable::new(),
            assignments: AssignmentTable::new(),
            detection: DetectionStateMachine::new(),
            classifier: ClassificationModel::new(),
            dice,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
            now: 0.0,
            last_summary: None,
        };

        for spec in &config.sensor_configs {
            match spec.parse::<OperatingPoint>() {
                Ok(point) => core.profiles.insert(point),
                Err(err) => core
                    .logger
                    .config_warning(&format!("bad sensor_config `{}`: {}", spec, err)),
            }
        }

        for spec in &config.hazards {
            if let Err(err) = core.catalog.add_hazard(spec) {
                core.logger
                    .config_warning(&format!("poorly specified hazard `{}`: {}", spec, err));
            }
        }

        if let Some(path) = &config.hazard_file {
            match core.catalog.load_from_file(path) {
                Ok(summary) => {
                    for (line, err) in summary.rejected {
                        let message = format!("poorly specified hazard `{}`: {}", line, err);
                        core.logger.config_warning(&message);
                    }
                }
                Err(err) => core.logger.config_warning(&err.to_string()),
            }
        }

        if core.catalog.is_empty() {
            core.logger.config_warning("no hazard field laydown provided");
        }

        core
    }

    /// Advances the clock and posts the operating-point summary when due.
    pub fn tick(&mut self, now: f64) -> Vec<OutboundEvent> {
        self.now = now;
        let due = match self.last_summary {
            Some(last) => now - last >= self.summary_interval,
            None => true,
        };
        if !due {
            return Vec::new();
        }

        self.last_summary = Some(now);
        vec![OutboundEvent::OptionsSummary {
            summary: self.profiles.summary(),
        }]
    }

    /// Applies one inbound event. Rejections are logged as run warnings
    /// and produce no outbound events.
    pub fn handle_event(&mut self, event: InboundEvent) -> Vec<OutboundEvent> {
        let kind = event.name();
        let result = match event {
            InboundEvent::PositionUpdate(report) => {
                self.update_position(&report).map(|_| Vec::new())
            }
            InboundEvent::SensorRequest { vname } => self.sensor_request(&vname),
            InboundEvent::SensorClear { vname } => self.sensor_clear(&vname).map(|_| Vec::new()),
            InboundEvent::ClassifyRequest { vname, label } => {
                self.classify_request(&vname, &label).map(|event| vec![event])
            }
            InboundEvent::ConfigRequest {
                source,
                vname,
                width,
                pd,
            } => self
                .configure(&source, &vname, width, pd)
                .map(|event| vec![event]),
        };

        match result {
            Ok(events) => {
                self.metrics.record_handled(kind);
                events
            }
            Err(err) => {
                self.metrics.record_rejected(kind);
                self.logger.run_warning(&err.to_string());
                Vec::new()
            }
        }
    }

    pub fn update_position(&mut self, report: &NodeReport) -> SensorResult<()> {
        if !report.is_valid() {
            return Err(SensorError::InvalidRequest(format!(
                "invalid node report for `{}`",
                report.name
            )));
        }

        self.logger
            .retract_run_warning(&SensorError::UnknownVehicle(report.name.clone()).to_string());
        if self.tracks.upsert(report) {
            debug!("first node report for {}", report.name);
        }
        Ok(())
    }

    /// Sweeps every catalog object against the vehicle's fresh swath and
    /// rolls detection for objects that just entered it. A vehicle with no
    /// setting yet gets the guessed one first, and its ack is returned
    /// ahead of any detections.
    pub fn sensor_request(&mut self, vname: &str) -> SensorResult<Vec<OutboundEvent>> {
        if vname.trim().is_empty() {
            return Err(SensorError::MissingVehicleName);
        }
        self.assignments.entry(vname).requests += 1;

        if !self.tracks.contains(vname) {
            return Err(SensorError::UnknownVehicle(vname.to_string()));
        }

        let mut events = Vec::new();
        if self.assignments.setting(vname).is_none() {
            self.logger
                .record(self.now, &format!("Setting sensor settings for: {}", vname));
            let ack = self.assignments.commit_guess(
                &self.profiles,
                vname,
                self.now,
                self.min_reset_interval,
            )?;
            events.push(OutboundEvent::ConfigAck(ack));
        }

        let setting = self
            .assignments
            .setting(vname)
            .ok_or_else(|| SensorError::NoSensorSetting(vname.to_string()))?;
        let polygon = self
            .tracks
            .rebuild_polygon(vname, &self.assignments, self.swath_length)?;

        let detected = self
            .detection
            .sweep(vname, polygon, &self.catalog, &setting, &mut self.dice);

        for label in detected {
            let Some(hazard) = self.catalog.get(&label) else {
                continue;
            };
            let report = DetectionReport::new(vname, hazard);
            events.push(OutboundEvent::Detection(report.clone()));
            events.push(OutboundEvent::VehicleDetection(report));

            self.classifier.record_hit(&label);
            self.assignments.entry(vname).detections += 1;
            self.logger
                .record(self.now, &format!("Detection report sent to vehicle: {}", vname));
        }

        Ok(events)
    }

    pub fn sensor_clear(&mut self, vname: &str) -> SensorResult<()> {
        if vname.trim().is_empty() {
            return Err(SensorError::MissingVehicleName);
        }
        self.logger
            .record(self.now, &format!("Sensor clear request for vehicle {}", vname));
        Ok(())
    }

    /// Answers a classification query if the label has a detection hit
    /// that has not been classified yet.
    pub fn classify_request(&mut self, vname: &str, label: &str) -> SensorResult<OutboundEvent> {
        if vname.trim().is_empty() {
            return Err(SensorError::MissingVehicleName);
        }
        if label.trim().is_empty() {
            return Err(SensorError::MissingHazardLabel);
        }
        self.logger.record(
            self.now,
            &format!("Sensor classify request received from: {}", vname),
        );

        let hazard = self
            .catalog
            .get(label)
            .ok_or_else(|| SensorError::UnknownHazard(label.to_string()))?;
        if self.classifier.ledger(label).unclassified_hits() == 0 {
            return Err(SensorError::QuerySaturated(label.to_string()));
        }
        let setting = self
            .assignments
            .setting(vname)
            .ok_or_else(|| SensorError::NoSensorSetting(vname.to_string()))?;

        let reported_kind = self
            .classifier
            .classify(&mut self.dice, hazard, setting.pclass)?;

        let report = ClassificationReport {
            vname: vname.to_string(),
            label: hazard.label.clone(),
            x: hazard.x,
            y: hazard.y,
            resemblance: hazard.resemblance,
            reported_kind,
        };
        self.assignments.entry(vname).classifications += 1;
        self.logger
            .record(self.now, &format!("Classify report queued to vehicle: {}", vname));

        Ok(OutboundEvent::Classification(report))
    }

    /// Explicit reconfiguration. The message source must be the vehicle
    /// being configured.
    pub fn configure(
        &mut self,
        source: &str,
        vname: &str,
        width: f64,
        pd: f64,
    ) -> SensorResult<OutboundEvent> {
        if vname.trim().is_empty() || vname != source {
            return Err(SensorError::ConfigMismatch {
                vname: vname.to_string(),
                source_name: source.to_string(),
            });
        }
        if !width.is_finite() || !pd.is_finite() {
            return Err(SensorError::InvalidRequest(format!(
                "bad sensor config request from: {}",
                vname
            )));
        }

        self.logger
            .record(self.now, &format!("Setting sensor settings for: {}", vname));
        let ack = self.assignments.commit(
            &self.profiles,
            vname,
            width,
            pd,
            self.now,
            self.min_reset_interval,
        )?;
        Ok(OutboundEvent::ConfigAck(ack))
    }

    pub fn status(&self) -> SensorStatus {
        SensorStatus {
            time: self.now,
            hazard_file: self.catalog.hazard_file().map(str::to_string),
            hazard_count: self.catalog.hazard_count(),
            benign_count: self.catalog.benign_count(),
            operating_points: self.profiles.points().to_vec(),
            vehicles: self.assignments.statuses(),
            metrics: self.metrics.snapshot(),
            run_warnings: self.logger.run_warnings().clone(),
            config_warnings: self.logger.config_warnings().to_vec(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn noise_model(&self) -> Option<NoiseModel> {
        self.noise
    }

    pub fn catalog(&self) -> &HazardCatalog {
        &self.catalog
    }

    pub fn profiles(&self) -> &SensorProfileTable {
        &self.profiles
    }

    pub fn profiles_mut(&mut self) -> &mut SensorProfileTable {
        &mut self.profiles
    }

    pub fn catalog_mut(&mut self) -> &mut HazardCatalog {
        &mut self.catalog
    }

    pub fn tracks(&self) -> &VehicleTrackTable {
        &self.tracks
    }

    pub fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    pub fn classifier(&self) -> &ClassificationModel {
        &self.classifier
    }

    pub fn detection(&self) -> &DetectionStateMachine {
        &self.detection
    }

    pub fn logger(&self) -> &LogManager {
        &self.logger
    }
}
