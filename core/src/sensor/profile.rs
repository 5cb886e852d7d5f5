use crate::interface::OperatingPoint;
use crate::prelude::{SensorError, SensorResult};
use crate::sensor::assignment::AssignmentTable;

/// Ordered set of discrete sensor operating points, ascending by width.
#[derive(Debug, Clone, Default)]
pub struct SensorProfileTable {
    points: Vec<OperatingPoint>,
}

impl SensorProfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps and inserts a point, keeping the table sorted by width.
    /// Points of equal width keep their insertion order.
    pub fn add_operating_point(
        &mut self,
        width: f64,
        exponent: f64,
        class_accuracy: f64,
        capacity: i64,
    ) -> OperatingPoint {
        let point = OperatingPoint::clamped(width, exponent, class_accuracy, capacity);
        self.insert(point);
        point
    }

    pub fn insert(&mut self, point: OperatingPoint) {
        self.points.push(point);
        self.points.sort_by(|a, b| a.width.total_cmp(&b.width));
    }

    /// Nearest-width match among points that still have room for `vname`.
    ///
    /// A point with non-zero capacity is skipped once that many *other*
    /// vehicles hold its width. Ties go to the first point in width order.
    pub fn select_operating_point(
        &self,
        requested_width: f64,
        vname: &str,
        assignments: &AssignmentTable,
    ) -> SensorResult<usize> {
        if self.points.is_empty() {
            return Err(SensorError::NoProfilesConfigured);
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, point) in self.points.iter().enumerate() {
            let saturated = point.capacity > 0
                && assignments.holders_of(point.width, vname) >= point.capacity as usize;
            if saturated {
                continue;
            }

            let delta = (requested_width - point.width).abs();
            if best.map_or(true, |(_, smallest)| delta < smallest) {
                best = Some((index, delta));
            }
        }

        best.map(|(index, _)| index)
            .ok_or_else(|| SensorError::ProfilesSaturated(vname.to_string()))
    }

    /// Width halfway between the narrowest and widest points.
    pub fn midpoint_width(&self) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.width + last.width) / 2.0)
    }

    pub fn get(&self, index: usize) -> Option<&OperatingPoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[OperatingPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `width=..,exp=..,class=..` entries joined by `:`.
    pub fn summary(&self) -> String {
        self.points
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }
}
