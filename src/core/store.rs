//! Point store - the retained time-series log
//!
//! Single owner of the log (model -> point type -> series). One coarse
//! `RwLock` serializes appends against queries, so a query never sees a
//! series mid-append and every caller observes the same per-series order.
//!
//! No I/O happens under the lock; the broker copies what it needs and
//! delivers after release.

use crate::core::point::{ModelSeries, Point, Sample, Series, Snapshot};
use parking_lot::RwLock;
use std::collections::HashMap;

type Log = HashMap<String, HashMap<String, Series>>;

/// In-memory append-only log keyed by (model, point type)
///
/// Grows for the life of the process; there is no eviction.
#[derive(Debug, Default)]
pub struct PointStore {
    log: RwLock<Log>,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point to its series, creating the model/type entries if absent
    pub fn append(&self, point: &Point) {
        let sample = point.sample();
        let mut log = self.log.write();

        // Avoid allocating key strings once the series exists
        if let Some(series) = log
            .get_mut(&point.model_name)
            .and_then(|types| types.get_mut(&point.point_type))
        {
            series.push(sample);
            return;
        }

        log.entry(point.model_name.clone())
            .or_default()
            .entry(point.point_type.clone())
            .or_default()
            .push(sample);
    }

    /// Distinct model names currently present
    ///
    /// Returned sorted for stable output; callers must not depend on order.
    pub fn model_names(&self) -> Vec<String> {
        let log = self.log.read();
        let mut names: Vec<String> = log.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Copy every series of the requested models
    ///
    /// Names without data are omitted. The result is detached from the log
    /// and unaffected by later appends.
    pub fn query<S: AsRef<str>>(&self, model_names: &[S]) -> Snapshot {
        let log = self.log.read();
        let mut snapshot = Snapshot::new();

        for name in model_names {
            let name = name.as_ref();
            if snapshot.contains_key(name) {
                continue;
            }
            if let Some(types) = log.get(name) {
                let series: ModelSeries = types
                    .iter()
                    .map(|(point_type, samples)| (point_type.clone(), samples.clone()))
                    .collect();
                snapshot.insert(name.to_string(), series);
            }
        }

        snapshot
    }

    /// Copy of one series, if present
    pub fn series(&self, model_name: &str, point_type: &str) -> Option<Vec<Sample>> {
        self.log
            .read()
            .get(model_name)
            .and_then(|types| types.get(point_type))
            .cloned()
    }

    /// Total number of retained samples
    pub fn len(&self) -> usize {
        self.log
            .read()
            .values()
            .flat_map(|types| types.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }

    /// Number of distinct (model, type) series
    pub fn series_count(&self) -> usize {
        self.log.read().values().map(HashMap::len).sum()
    }
}
