//! # Storage Layer
//!
//! File-backed state for the stateful nodes, plus configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Graph plotter series | JSON snapshot | `{state_dir}/graph_plotter_state.json` |
//! | Story driver projects | JSON snapshot | `{state_dir}/story_driver_state.json` |
//! | Log files | Plain text | `{dir}/{name}.txt` |
//! | Config | TOML | `~/.config/pipo/config.toml`, `./pipo.toml` |
//!
//! ## Concurrency Safety
//!
//! - Each store keeps its table behind a mutex, so node execution and HTTP
//!   resets never interleave inside one process
//! - Snapshot writes hold an `fs2` exclusive lock on `{name}.json.lock` while
//!   a temp file is written and renamed over the target
//! - Write failures are logged; the in-memory table stays authoritative
//!
//! ## Key Types
//!
//! - [`PointSeriesStore`] - `(x, y)` series per graph plotter
//! - [`ProjectStore`] - step/seed counter per story project
//! - [`SnapshotFile`] - whole-table JSON file
//! - [`Config`] - Global and local configuration

mod config;
pub mod logfile;
mod points;
mod projects;
mod snapshot;

pub use config::{Config, ConfigError, ServerConfig, LOCAL_CONFIG_FILE, POINTS_FILE, PROJECTS_FILE};
pub use points::{node_key, PlotUpdate, PointSeries, PointSeriesStore, PointTable, DEFAULT_NODE_ID};
pub use projects::{ProjectState, ProjectStore, ProjectTable, StoryFrame, DEFAULT_PROJECT};
pub use snapshot::{SnapshotFile, StoreError};
