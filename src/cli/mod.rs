//! # Command-Line Interface
//!
//! The `pipo` binary: run nodes from a shell, drive them from a host over
//! stdin or HTTP, and inspect their saved state.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Nodes | Catalogue and execution | `nodes`, `run`, `exec` |
//! | Server | HTTP endpoints | `serve` |
//! | Tools | One-shot node operations | `roll`, `shot`, `save-data`, `read-data` |
//! | State | Stored logs and tables | `log write`, `plot show`, `story reset` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! `exec` always answers in JSON lines.
//!
//! ## Logging
//!
//! Logs go to stderr. `RUST_LOG` sets the filter; otherwise the level is
//! `warn`, `info` for `serve`, and `debug` with `--verbose`.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod log;
mod node_cmd;
mod output;
mod plot;
mod story;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
