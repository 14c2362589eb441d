//! Chart series projection.
//!
//! Records are sorted once by calendar date (stable, so records sharing a
//! date keep their input order) and then projected into the shapes chart
//! components consume. Labels are the literal record dates in sorted order;
//! duplicate dates are not merged.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{MovingAverage, StockRecord};

/// Single chart point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point<Y> {
    pub x: String,
    pub y: Y,
}

impl<Y> Point<Y> {
    pub fn new(x: impl Into<String>, y: Y) -> Self {
        Self { x: x.into(), y }
    }
}

/// One moving-average overlay. `None` points render as gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySeries {
    pub average: MovingAverage,
    pub points: Vec<Point<Option<f64>>>,
}

/// Every series emitted for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSet {
    pub labels: Vec<String>,
    pub close: Vec<Point<f64>>,
    pub ohlc: Vec<Point<[f64; 4]>>,
    pub overlays: Vec<OverlaySeries>,
}

impl SeriesSet {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn overlay(&self, average: MovingAverage) -> Option<&OverlaySeries> {
        self.overlays
            .iter()
            .find(|overlay| overlay.average == average)
    }
}

/// Moving-average overlays switched on by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayToggles {
    enabled: BTreeSet<MovingAverage>,
}

impl OverlayToggles {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        MovingAverage::ALL.into_iter().collect()
    }

    /// Flip an overlay and return whether it is now enabled.
    pub fn toggle(&mut self, average: MovingAverage) -> bool {
        if self.enabled.remove(&average) {
            false
        } else {
            self.enabled.insert(average);
            true
        }
    }

    pub fn enable(mut self, average: MovingAverage) -> Self {
        self.enabled.insert(average);
        self
    }

    pub fn is_enabled(&self, average: MovingAverage) -> bool {
        self.enabled.contains(&average)
    }

    pub fn iter(&self) -> impl Iterator<Item = MovingAverage> + '_ {
        self.enabled.iter().copied()
    }
}

impl FromIterator<MovingAverage> for OverlayToggles {
    fn from_iter<T: IntoIterator<Item = MovingAverage>>(iter: T) -> Self {
        Self {
            enabled: iter.into_iter().collect(),
        }
    }
}

/// Stable ascending sort by [`StockRecord::calendar_date`].
pub fn sort_chronologically(records: &[StockRecord]) -> Vec<StockRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(StockRecord::calendar_date);
    sorted
}

/// Trailing simple moving average. Positions before the window fills are `None`.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (index, value) in values.iter().enumerate() {
        sum += value;
        if index >= window {
            sum -= values[index - window];
        }
        if index + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Sorted view over one fetch result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesBuilder {
    records: Vec<StockRecord>,
}

impl SeriesBuilder {
    pub fn new(records: &[StockRecord]) -> Self {
        Self {
            records: sort_chronologically(records),
        }
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.records.iter().map(|record| record.date.clone()).collect()
    }

    pub fn close_points(&self) -> impl Iterator<Item = Point<f64>> + '_ {
        self.records
            .iter()
            .map(|record| Point::new(record.date.as_str(), record.close))
    }

    pub fn close_series(&self) -> Vec<Point<f64>> {
        self.close_points().collect()
    }

    pub fn ohlc_series(&self) -> Vec<Point<[f64; 4]>> {
        self.records
            .iter()
            .map(|record| Point::new(record.date.as_str(), record.ohlc()))
            .collect()
    }

    /// Overlay using the record's own average where present and a value
    /// computed from trailing closes otherwise.
    pub fn overlay_series(&self, average: MovingAverage) -> OverlaySeries {
        let needs_fallback = self
            .records
            .iter()
            .any(|record| record.moving_average(average).is_none());
        let computed = if needs_fallback {
            let closes: Vec<f64> = self.records.iter().map(|record| record.close).collect();
            simple_moving_average(&closes, average.window())
        } else {
            Vec::new()
        };

        let points = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let value = record
                    .moving_average(average)
                    .or_else(|| computed.get(index).copied().flatten());
                Point::new(record.date.as_str(), value)
            })
            .collect();

        OverlaySeries { average, points }
    }

    pub fn build(&self, toggles: &OverlayToggles) -> SeriesSet {
        if self.records.is_empty() {
            return SeriesSet::default();
        }

        SeriesSet {
            labels: self.labels(),
            close: self.close_series(),
            ohlc: self.ohlc_series(),
            overlays: toggles
                .iter()
                .map(|average| self.overlay_series(average))
                .collect(),
        }
    }
}

/// Sort `records` and project every series enabled by `toggles`.
pub fn build_series(records: &[StockRecord], toggles: &OverlayToggles) -> SeriesSet {
    SeriesBuilder::new(records).build(toggles)
}
