//! Point-series store for the graph plotter
//!
//! One table of `(x, y)` series keyed by node id, loaded once when the store
//! is opened and written in full after every mutation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::snapshot::SnapshotFile;

/// Node id used when the host supplies none
pub const DEFAULT_NODE_ID: &str = "default";

/// Parallel x/y values for one plotter instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointSeries {
    #[serde(rename = "x_data", default)]
    pub x_values: Vec<i64>,
    #[serde(rename = "y_data", default)]
    pub y_values: Vec<i64>,
}

impl PointSeries {
    pub fn len(&self) -> usize {
        self.x_values.len().min(self.y_values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, x: i64, y: i64) {
        self.x_values.push(x);
        self.y_values.push(y);
    }

    fn clear(&mut self) {
        self.x_values.clear();
        self.y_values.clear();
    }
}

pub type PointTable = BTreeMap<String, PointSeries>;

/// Payload sent to the plot widget after each append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotUpdate {
    pub x_values: Vec<i64>,
    pub y_values: Vec<i64>,
    pub node_id: String,
    pub point_count: usize,
}

/// Resolves an optional host id to a table key
pub fn node_key(node_id: Option<&str>) -> &str {
    match node_id {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_NODE_ID,
    }
}

#[derive(Debug)]
pub struct PointSeriesStore {
    file: SnapshotFile<PointTable>,
    table: Mutex<PointTable>,
}

impl PointSeriesStore {
    /// Opens the store, loading the snapshot at `path` if one exists
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let file = SnapshotFile::new(path);
        let table = file.load_or_default();
        Self {
            file,
            table: Mutex::new(table),
        }
    }

    fn table(&self) -> MutexGuard<'_, PointTable> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, table: &PointTable) {
        if let Err(e) = self.file.save(table) {
            tracing::warn!(error = %e, "Failed to persist graph data");
        }
    }

    /// Appends a point to `node_id`'s series and returns the full series
    pub fn append(&self, node_id: Option<&str>, x: i64, y: i64) -> PlotUpdate {
        let key = node_key(node_id);
        let mut table = self.table();

        let series = table.entry(key.to_string()).or_default();
        series.push(x, y);
        let update = PlotUpdate {
            x_values: series.x_values.clone(),
            y_values: series.y_values.clone(),
            node_id: key.to_string(),
            point_count: series.len(),
        };

        self.persist(&table);
        tracing::debug!(node_id = key, x, y, points = update.point_count, "Plotted point");
        update
    }

    /// Clears a known series; returns false when `node_id` has never plotted
    pub fn reset(&self, node_id: &str) -> bool {
        let mut table = self.table();
        let Some(series) = table.get_mut(node_id) else {
            tracing::debug!(node_id, "Reset ignored for unknown graph");
            return false;
        };

        series.clear();
        self.persist(&table);
        tracing::info!(node_id, "Graph data reset");
        true
    }

    pub fn series(&self, node_id: &str) -> Option<PointSeries> {
        self.table().get(node_id).cloned()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.table().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> PointSeriesStore {
        PointSeriesStore::open(dir.path().join("graph_plotter_state.json"))
    }

    #[test]
    fn append_accumulates_points() {
        let dir = TempDir::new().unwrap();
        let points = store(&dir);

        points.append(Some("7"), 0, 10);
        let update = points.append(Some("7"), 1, 12);

        assert_eq!(update.x_values, vec![0, 1]);
        assert_eq!(update.y_values, vec![10, 12]);
        assert_eq!(update.node_id, "7");
        assert_eq!(update.point_count, 2);
    }

    #[test]
    fn missing_id_uses_default_key() {
        let dir = TempDir::new().unwrap();
        let points = store(&dir);

        assert_eq!(points.append(None, 1, 1).node_id, "default");
        assert_eq!(points.append(Some(""), 2, 2).point_count, 2);
    }

    #[test]
    fn reset_then_append_yields_one_point() {
        let dir = TempDir::new().unwrap();
        let points = store(&dir);
        points.append(Some("a"), 1, 2);
        points.append(Some("a"), 3, 4);

        assert!(points.reset("a"));
        assert!(points.series("a").unwrap().is_empty());
        assert_eq!(points.append(Some("a"), 5, 6).point_count, 1);
    }

    #[test]
    fn reset_unknown_key_is_noop() {
        let dir = TempDir::new().unwrap();
        let points = store(&dir);
        assert!(!points.reset("never"));
        assert!(points.series("never").is_none());
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        store(&dir).append(Some("n1"), 4, 9);

        let raw = fs::read_to_string(dir.path().join("graph_plotter_state.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json, serde_json::json!({"n1": {"x_data": [4], "y_data": [9]}}));

        let reopened = store(&dir);
        assert_eq!(reopened.series("n1").unwrap().x_values, vec![4]);
        assert_eq!(reopened.node_ids(), vec!["n1".to_string()]);
    }

    #[test]
    fn corrupt_snapshot_starts_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("graph_plotter_state.json"), "[1,").unwrap();

        let points = store(&dir);
        assert!(points.node_ids().is_empty());
        assert_eq!(points.append(Some("x"), 0, 0).point_count, 1);
    }
}
