use crate::interface::{Hazard, HazardKind, HazardSpec};
use crate::prelude::{SensorError, SensorResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Outcome of loading a hazard file. Bad lines are skipped, not fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HazardFileSummary {
    pub loaded: usize,
    pub rejected: Vec<(String, SensorError)>,
}

/// Field laydown of hazards and benign decoys, keyed by label.
///
/// Iteration follows label order so that sweeps consume draws in a
/// reproducible sequence.
#[derive(Debug, Default)]
pub struct HazardCatalog {
    hazards: BTreeMap<String, Hazard>,
    hazard_count: usize,
    benign_count: usize,
    hazard_file: Option<String>,
}

impl HazardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and inserts one `x=..,y=..,type=..` spec. An absent label
    /// becomes the current catalog size.
    pub fn add_hazard(&mut self, line: &str) -> SensorResult<String> {
        let spec: HazardSpec = line.parse()?;
        let next_label = self.hazards.len().to_string();
        let hazard = spec.into_hazard(|| next_label)?;
        self.insert(hazard)
    }

    pub fn insert(&mut self, hazard: Hazard) -> SensorResult<String> {
        if self.hazards.contains_key(&hazard.label) {
            return Err(SensorError::DuplicateLabel(hazard.label));
        }

        match hazard.kind {
            HazardKind::Hazard => self.hazard_count += 1,
            HazardKind::Benign => self.benign_count += 1,
        }
        let label = hazard.label.clone();
        self.hazards.insert(label.clone(), hazard);
        Ok(label)
    }

    /// Loads `hazard = <spec>` directives from a file.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> SensorResult<HazardFileSummary> {
        let path_ref = path.as_ref();
        let display = path_ref.display().to_string();
        let contents = fs::read_to_string(path_ref).map_err(|err| SensorError::HazardFile {
            path: display.clone(),
            reason: err.to_string(),
        })?;
        if contents.trim().is_empty() {
            return Err(SensorError::HazardFile {
                path: display,
                reason: "file is empty".into(),
            });
        }

        self.hazard_file = Some(display);
        Ok(self.load_from_str(&contents))
    }

    pub fn load_from_str(&mut self, contents: &str) -> HazardFileSummary {
        let mut summary = HazardFileSummary::default();
        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("hazard") {
                continue;
            }
            match self.add_hazard(value.trim()) {
                Ok(_) => summary.loaded += 1,
                Err(err) => summary.rejected.push((value.trim().to_string(), err)),
            }
        }
        summary
    }

    pub fn get(&self, label: &str) -> Option<&Hazard> {
        self.hazards.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.values()
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn hazard_count(&self) -> usize {
        self.hazard_count
    }

    pub fn benign_count(&self) -> usize {
        self.benign_count
    }

    pub fn hazard_file(&self) -> Option<&str> {
        self.hazard_file.as_deref()
    }
}
