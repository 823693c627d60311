//! Main CLI application structure

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{log, node_cmd, plot, story};
use crate::codec::{self, DataFormat};
use crate::domain::{dice, shot, Die};
use crate::node::NodeRuntime;
use crate::server;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "pipo")]
#[command(author, version, about = "Utility nodes for node-graph workflows")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory for saved data and logs
    #[arg(long, global = true, env = "PIPO_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for graph plotter and story driver state
    #[arg(long, global = true, env = "PIPO_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available nodes
    Nodes,

    /// Run a single node
    ///
    /// Examples:
    ///   pipo run MF_ShotHelper --inputs '{"step": 7, "beats": "3,8,15"}'
    ///   pipo run MF_ModuloAdvanced --id 4 --inputs '{"input_number": 23}'
    Run {
        /// Node class name or display name
        node: String,

        /// Node instance id
        #[arg(long)]
        id: Option<String>,

        /// Node inputs (JSON object)
        #[arg(long, default_value = "{}")]
        inputs: String,
    },

    /// Run node requests read as JSON lines from stdin
    Exec,

    /// Start the HTTP server
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Roll a die
    Roll {
        /// D4, D6, D8, D10, D12, D20 or D100
        #[arg(default_value = "D6")]
        dice: Die,
    },

    /// Compute the sequence and shot for a step
    Shot {
        step: i64,

        /// Beat markers, e.g. "3,8,15" or "[3,8,15]"
        #[arg(long, default_value = "")]
        beats: String,
    },

    /// Save text as JSON, XML, CSV or YAML
    SaveData {
        /// Data to save (read from stdin when omitted)
        data: Option<String>,

        /// Target format
        #[arg(long = "to", value_enum, default_value = "json")]
        target: DataFormat,

        /// File name without extension
        #[arg(long, default_value = "data")]
        filename: String,

        /// Directory (defaults to the output directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Read a data file, converting by extension
    ReadData {
        filename: String,

        /// Directory (defaults to the output directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Write and read log files
    #[command(subcommand)]
    Log(log::LogCommands),

    /// Manage graph plotter series
    #[command(subcommand)]
    Plot(plot::PlotCommands),

    /// Manage story driver projects
    #[command(subcommand)]
    Story(story::StoryCommands),
}

fn init_tracing(verbose: bool, serving: bool) {
    let default_level = if verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    let output = Output::new(cli.format);
    let config = Config::load()?.with_overrides(cli.output_dir, cli.state_dir);
    tracing::debug!(
        output_dir = %config.output_dir.display(),
        state_dir = %config.state_dir().display(),
        "Loaded configuration"
    );

    match cli.command {
        Commands::Nodes => node_cmd::list(&output)?,
        Commands::Run { node, id, inputs } => node_cmd::run(&output, &config, &node, id, &inputs)?,
        Commands::Exec => node_cmd::exec(&config)?,
        Commands::Serve { bind } => serve(&config, bind)?,
        Commands::Roll { dice } => roll(&output, dice),
        Commands::Shot { step, beats } => shot_cmd(&output, step, &beats),
        Commands::SaveData { data, target, filename, dir } => {
            save_data(&output, &config, data, target, &filename, dir)?
        }
        Commands::ReadData { filename, dir } => read_data(&output, &config, &filename, dir)?,
        Commands::Log(cmd) => log::run(cmd, &output, &config)?,
        Commands::Plot(cmd) => plot::run(cmd, &output, &config)?,
        Commands::Story(cmd) => story::run(cmd, &output, &config)?,
    }

    Ok(())
}

fn serve(config: &Config, bind: Option<String>) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(bind) = bind {
        server_config.bind = bind;
    }
    let addr = server_config.socket_addr()?;
    let runtime = Arc::new(NodeRuntime::from_config(config));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?
        .block_on(server::serve(runtime, addr))
        .with_context(|| format!("Server on {} failed", addr))
}

fn roll(output: &Output, die: Die) {
    let result = die.roll(&mut rand::thread_rng());
    if output.is_json() {
        output.data(&serde_json::json!({"dice": die, "result": result}));
    } else {
        output.success(&dice::roll_display(result));
    }
}

fn shot_cmd(output: &Output, step: i64, beats: &str) {
    let position = shot::calculate(step, beats);
    if output.is_json() {
        output.data(&serde_json::json!({
            "sequence": position.sequence,
            "shot": position.shot,
            "shot_name": position.shot_name(),
        }));
    } else {
        output.success(&position.shot_name());
    }
}

fn save_data(
    output: &Output,
    config: &Config,
    data: Option<String>,
    target: DataFormat,
    filename: &str,
    dir: Option<PathBuf>,
) -> Result<()> {
    let data = match data {
        Some(data) => data,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read data from stdin")?;
            buf
        }
    };

    let dir = dir.unwrap_or_else(|| config.output_dir.clone());
    let path = codec::write_data(&data, &dir, filename, target)
        .with_context(|| format!("Failed to save {} data", target))?;

    if output.is_json() {
        output.data(&serde_json::json!({"path": path.display().to_string(), "format": target}));
    } else {
        output.success(&format!("Saved {}", path.display()));
    }
    Ok(())
}

fn read_data(output: &Output, config: &Config, filename: &str, dir: Option<PathBuf>) -> Result<()> {
    let path = dir.unwrap_or_else(|| config.output_dir.clone()).join(filename);
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let data = codec::load_data(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    if output.is_json() {
        output.data(&serde_json::json!({"path": path.display().to_string(), "data": data}));
    } else {
        output.text(&data);
    }
    Ok(())
}
