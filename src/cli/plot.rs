//! Graph plotter CLI commands

use anyhow::{anyhow, Result};
use clap::Subcommand;

use super::output::Output;
use crate::storage::{Config, PointSeriesStore, DEFAULT_NODE_ID};

#[derive(Subcommand)]
pub enum PlotCommands {
    /// Append a point to a series
    Add {
        x: i64,
        y: i64,

        /// Plotter node id
        #[arg(long, default_value = DEFAULT_NODE_ID)]
        id: String,
    },

    /// Clear a series
    Reset {
        /// Plotter node id
        id: String,
    },

    /// Print a series, or list series ids when none is given
    Show {
        /// Plotter node id
        id: Option<String>,
    },
}

pub fn run(cmd: PlotCommands, output: &Output, config: &Config) -> Result<()> {
    let store = PointSeriesStore::open(config.points_path());

    match cmd {
        PlotCommands::Add { x, y, id } => {
            let update = store.append(Some(&id), x, y);
            if output.is_json() {
                output.data(&update);
            } else {
                output.success(&format!("Point {}: ({}, {})", update.point_count, x, y));
            }
        }

        PlotCommands::Reset { id } => {
            if store.reset(&id) {
                output.success(&format!("Graph data reset for {}", id));
            } else {
                output.success(&format!("No graph data for {}", id));
            }
        }

        PlotCommands::Show { id: None } => {
            let ids = store.node_ids();
            if output.is_json() {
                output.data(&ids);
            } else {
                for id in ids {
                    output.text(&id);
                }
            }
        }

        PlotCommands::Show { id: Some(id) } => {
            let series = store
                .series(&id)
                .ok_or_else(|| anyhow!("No graph data for '{}'", id))?;
            if output.is_json() {
                output.data(&series);
            } else {
                output.row(&["x", "y"]);
                for (x, y) in series.x_values.iter().zip(&series.y_values) {
                    output.row(&[x.to_string().as_str(), y.to_string().as_str()]);
                }
            }
        }
    }

    Ok(())
}
