//! Distance → lift percentage lookup table.
//!
//! Built once at startup (from a stored table or from a calibration fit) and
//! never mutated afterwards; the sequencer shares it behind an `Arc`.

use std::collections::BTreeMap;

use crate::error::ThrowError;
use crate::model::{self, CalibrationSeries, ModelKind};

/// Result of resolving a throw request against the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// Lift percentage in [0,1).
    pub percentage: f64,
    /// Distance key that was looked up; `None` when the request was already a fraction.
    pub distance_cm: Option<i32>,
    /// The requested distance lay outside `[start, end]` and was clamped.
    pub clamped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMap {
    entries: BTreeMap<i32, f64>,
    start: i32,
    end: i32,
}

impl DistanceMap {
    /// Build a table from `(distance_cm, percentage)` pairs.
    ///
    /// Rejects an empty table, duplicate distances and percentages outside [0,1).
    pub fn new(entries: impl IntoIterator<Item = (i32, f64)>) -> Result<Self, ThrowError> {
        let mut map = BTreeMap::new();
        for (distance, pct) in entries {
            if !(pct.is_finite() && (0.0..1.0).contains(&pct)) {
                return Err(ThrowError::InvalidMapping(format!(
                    "percentage for {distance} cm must be in [0, 1), got {pct}"
                )));
            }
            if map.insert(distance, pct).is_some() {
                return Err(ThrowError::InvalidMapping(format!(
                    "duplicate distance {distance} cm"
                )));
            }
        }
        let (Some((&start, _)), Some((&end, _))) = (map.first_key_value(), map.last_key_value())
        else {
            return Err(ThrowError::InvalidMapping("table is empty".into()));
        };
        let table = Self {
            entries: map,
            start,
            end,
        };
        if !table.is_monotonic() {
            tracing::warn!(start, end, "mapping table is not monotonic in distance");
        }
        Ok(table)
    }

    /// Fit `kind` to a calibration series and invert it into a table.
    pub fn from_calibration(
        series: &CalibrationSeries,
        kind: ModelKind,
    ) -> Result<Self, ThrowError> {
        model::fit(series, kind)
    }

    /// Smallest distance in the table (cm).
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Largest distance in the table (cm).
    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.entries.iter().map(|(d, p)| (*d, *p))
    }

    pub fn clamp(&self, distance: i32) -> i32 {
        distance.clamp(self.start, self.end)
    }

    /// True if percentages never decrease as distance grows.
    pub fn is_monotonic(&self) -> bool {
        self.entries
            .values()
            .zip(self.entries.values().skip(1))
            .all(|(a, b)| a <= b)
    }

    /// Percentage for `distance`, clamped into `[start, end]`.
    ///
    /// A distance missing inside the range uses the nearest lower entry.
    pub fn lookup(&self, distance: i32) -> f64 {
        let d = self.clamp(distance);
        // d >= start, so the range always has an entry
        self.entries
            .range(..=d)
            .next_back()
            .map_or(0.0, |(_, pct)| *pct)
    }

    /// Interpret `value` as either a fraction or a distance.
    ///
    /// `0 <= value < 1` is taken as the percentage itself. Anything else
    /// (including exactly 1 and negatives) is floored to whole centimetres
    /// and looked up. NaN counts as below range.
    pub fn resolve(&self, value: f64) -> Resolved {
        if (0.0..1.0).contains(&value) {
            return Resolved {
                percentage: value,
                distance_cm: None,
                clamped: false,
            };
        }
        // float-to-int casts saturate; NaN has no ordering so send it to the bottom
        let requested = if value.is_nan() {
            i32::MIN
        } else {
            value.floor() as i32
        };
        let d = self.clamp(requested);
        Resolved {
            percentage: self.lookup(d),
            distance_cm: Some(d),
            clamped: d != requested,
        }
    }

    pub fn resolve_percentage(&self, value: f64) -> f64 {
        self.resolve(value).percentage
    }
}
