use crate::interface::{Hazard, HazardKind};
use crate::math::dice::threshold;
use crate::prelude::{RandomSource, SensorError, SensorResult};
use std::collections::BTreeMap;

/// Detection hits and answered classification queries for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitLedger {
    pub hits: u32,
    pub queries: u32,
}

impl HitLedger {
    pub fn unclassified_hits(&self) -> u32 {
        self.hits.saturating_sub(self.queries)
    }
}

/// Probability that the classifier reports the true class.
///
/// Benign objects that resemble hazards push the probability of an
/// erroneous "benign" call toward 1 - pclass.
pub fn classification_probability(hazard: &Hazard, pclass: f64) -> f64 {
    match hazard.kind {
        HazardKind::Hazard => pclass,
        HazardKind::Benign => pclass + (1.0 - pclass) * (1.0 - hazard.resemblance),
    }
}

/// Classification dice and the per-label hit accounting that gates them.
#[derive(Debug, Default)]
pub struct ClassificationModel {
    ledger: BTreeMap<String, HitLedger>,
}

impl ClassificationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self, label: &str) {
        self.ledger.entry(label.to_string()).or_default().hits += 1;
    }

    pub fn ledger(&self, label: &str) -> HitLedger {
        self.ledger.get(label).copied().unwrap_or_default()
    }

    /// Rolls a classification for `hazard` if an unclassified hit is
    /// available. The returned kind is what gets reported, which is not
    /// necessarily the truth.
    pub fn classify<R: RandomSource + ?Sized>(
        &mut self,
        dice: &mut R,
        hazard: &Hazard,
        pclass: f64,
    ) -> SensorResult<HazardKind> {
        if self.ledger(&hazard.label).unclassified_hits() == 0 {
            return Err(SensorError::QuerySaturated(hazard.label.clone()));
        }

        let probability = classification_probability(hazard, pclass);
        let reported = if dice.draw() > threshold(probability) {
            hazard.kind.flipped()
        } else {
            hazard.kind
        };

        self.ledger.entry(hazard.label.clone()).or_default().queries += 1;
        Ok(reported)
    }
}
