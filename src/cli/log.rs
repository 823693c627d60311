//! Log file CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::storage::{logfile, Config};

#[derive(Subcommand)]
pub enum LogCommands {
    /// Append a timestamped entry and print the log
    Write {
        entry: String,

        /// Log directory (defaults to the output directory)
        #[arg(long, default_value = "")]
        dir: String,

        /// Log file name, `.txt` is added when missing
        #[arg(long, default_value = logfile::DEFAULT_LOG_NAME)]
        name: String,
    },

    /// Print a log
    Read {
        /// Log directory (defaults to the output directory)
        #[arg(long, default_value = "")]
        dir: String,

        #[arg(long, default_value = logfile::DEFAULT_LOG_NAME)]
        name: String,
    },
}

pub fn run(cmd: LogCommands, output: &Output, config: &Config) -> Result<()> {
    let (content, path) = match cmd {
        LogCommands::Write { entry, dir, name } => (
            logfile::write_log(&entry, &dir, &name, &config.output_dir),
            logfile::log_file_path(&dir, &name, &config.output_dir),
        ),
        LogCommands::Read { dir, name } => (
            logfile::read_log(&dir, &name, &config.output_dir),
            logfile::log_file_path(&dir, &name, &config.output_dir),
        ),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "content": content,
        }));
    } else {
        output.text(content.trim_end());
    }
    Ok(())
}
