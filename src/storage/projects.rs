//! Per-project step and seed counters for the story driver

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::snapshot::SnapshotFile;

/// Project used when the caller names none
pub const DEFAULT_PROJECT: &str = "MyProject";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    pub step: u64,
    pub seed: u64,
}

pub type ProjectTable = BTreeMap<String, ProjectState>;

/// Values handed out by one story-driver pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryFrame {
    pub step: u64,
    pub seed: u64,
    pub project_name: String,
    pub save_folder: String,
}

impl StoryFrame {
    fn new(name: &str, state: ProjectState) -> Self {
        let project_name = name.replace(' ', "_");
        let save_folder = format!("{}_{}", project_name, state.seed);
        Self {
            step: state.step,
            seed: state.seed,
            project_name,
            save_folder,
        }
    }
}

#[derive(Debug)]
pub struct ProjectStore {
    file: SnapshotFile<ProjectTable>,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    table: ProjectTable,
    rng: StdRng,
}

impl Inner {
    fn fresh(&mut self) -> ProjectState {
        ProjectState {
            step: 0,
            seed: self.rng.gen(),
        }
    }
}

impl ProjectStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_rng(path, StdRng::from_entropy())
    }

    /// Opens the store drawing seeds from `rng`
    pub fn with_rng(path: impl Into<PathBuf>, rng: StdRng) -> Self {
        let file = SnapshotFile::new(path);
        let table = file.load_or_default();
        Self {
            file,
            inner: Mutex::new(Inner { table, rng }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, table: &ProjectTable) {
        if let Err(e) = self.file.save(table) {
            tracing::warn!(error = %e, "Failed to persist story driver state");
        }
    }

    /// Returns the current step and seed for `name`, then moves it one step on
    pub fn advance(&self, name: &str) -> StoryFrame {
        let mut inner = self.inner();

        let current = match inner.table.get(name) {
            Some(state) => *state,
            None => {
                let state = inner.fresh();
                inner.table.insert(name.to_string(), state);
                self.persist(&inner.table);
                tracing::info!(project = name, seed = state.seed, "Created project");
                state
            }
        };

        inner.table.insert(
            name.to_string(),
            ProjectState {
                step: current.step + 1,
                seed: current.seed,
            },
        );
        self.persist(&inner.table);

        tracing::debug!(project = name, step = current.step, "Advanced project");
        StoryFrame::new(name, current)
    }

    /// Rewinds `name` to step 0, drawing a new seed when `randomize_seed` is set
    pub fn reset(&self, name: &str, randomize_seed: bool) -> ProjectState {
        let mut inner = self.inner();

        let mut state = match inner.table.get(name) {
            Some(state) => *state,
            None => inner.fresh(),
        };
        state.step = 0;
        if randomize_seed {
            state.seed = inner.rng.gen();
        }

        inner.table.insert(name.to_string(), state);
        self.persist(&inner.table);
        tracing::info!(project = name, seed = state.seed, "Project reset");
        state
    }

    pub fn get(&self, name: &str) -> Option<ProjectState> {
        self.inner().table.get(name).copied()
    }
}
