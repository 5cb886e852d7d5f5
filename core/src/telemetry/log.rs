use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

const MAX_EVENTS: usize = 64;

/// Ledger of warnings and events raised while the core runs.
///
/// Run warnings are deduplicated by message and may be retracted once the
/// condition clears. Config warnings are kept in arrival order.
pub struct LogManager {
    run_warnings: BTreeMap<String, u32>,
    config_warnings: Vec<String>,
    events: VecDeque<LoggedEvent>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoggedEvent {
    pub time: f64,
    pub message: String,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            run_warnings: BTreeMap::new(),
            config_warnings: Vec::new(),
            events: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn record(&mut self, time: f64, message: &str) {
        info!("{}", message);
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(LoggedEvent {
            time,
            message: message.to_string(),
        });
    }

    pub fn run_warning(&mut self, message: &str) {
        warn!("{}", message);
        *self.run_warnings.entry(message.to_string()).or_insert(0) += 1;
    }

    /// Drops an outstanding run warning. Returns true if one was present.
    pub fn retract_run_warning(&mut self, message: &str) -> bool {
        self.run_warnings.remove(message).is_some()
    }

    pub fn config_warning(&mut self, message: &str) {
        warn!("config: {}", message);
        self.config_warnings.push(message.to_string());
    }

    pub fn run_warnings(&self) -> &BTreeMap<String, u32> {
        &self.run_warnings
    }

    pub fn config_warnings(&self) -> &[String] {
        &self.config_warnings
    }

    pub fn events(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.events.iter()
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
