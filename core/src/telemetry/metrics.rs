use serde::Serialize;
use std::collections::BTreeMap;

/// Per-kind tallies of inbound events the core accepted or rejected.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    handled: BTreeMap<&'static str, usize>,
    rejected: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub handled: usize,
    pub rejected: usize,
    pub by_kind: BTreeMap<String, (usize, usize)>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_handled(&mut self, kind: &'static str) {
        *self.handled.entry(kind).or_insert(0) += 1;
    }

    pub fn record_rejected(&mut self, kind: &'static str) {
        *self.rejected.entry(kind).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut by_kind: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for (kind, count) in &self.handled {
            by_kind.entry(kind.to_string()).or_default().0 = *count;
        }
        for (kind, count) in &self.rejected {
            by_kind.entry(kind.to_string()).or_default().1 = *count;
        }

        MetricsSnapshot {
            handled: self.handled.values().sum(),
            rejected: self.rejected.values().sum(),
            by_kind,
        }
    }
}
