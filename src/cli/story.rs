//! Story driver CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::storage::{Config, ProjectStore, DEFAULT_PROJECT};

#[derive(Subcommand)]
pub enum StoryCommands {
    /// Take the next step of a project
    Next {
        #[arg(default_value = DEFAULT_PROJECT)]
        project: String,
    },

    /// Rewind a project to step 0
    Reset {
        #[arg(default_value = DEFAULT_PROJECT)]
        project: String,

        /// Keep the current seed
        #[arg(long)]
        keep_seed: bool,
    },
}

pub fn run(cmd: StoryCommands, output: &Output, config: &Config) -> Result<()> {
    let store = ProjectStore::open(config.projects_path());

    match cmd {
        StoryCommands::Next { project } => {
            let frame = store.advance(&project);
            if output.is_json() {
                output.data(&frame);
            } else {
                output.row(&["step", &frame.step.to_string()]);
                output.row(&["seed", &frame.seed.to_string()]);
                output.row(&["project", &frame.project_name]);
                output.row(&["folder", &frame.save_folder]);
            }
        }

        StoryCommands::Reset { project, keep_seed } => {
            let state = store.reset(&project, !keep_seed);
            if output.is_json() {
                output.data(&serde_json::json!({
                    "project_name": project,
                    "step": state.step,
                    "seed": state.seed,
                }));
            } else {
                output.success(&format!("Reset {} (seed {})", project, state.seed));
            }
        }
    }

    Ok(())
}
