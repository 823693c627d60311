//! pipo - Utility nodes for node-graph workflows
//!
//! A pack of small nodes a graph engine drives by class name: dice, line
//! tools, modulo with cycle tracking, sequence/shot numbering, a persisted
//! point plotter, a per-project step and seed counter, log files, and
//! conversion between JSON, XML, CSV and YAML. The `pipo` binary runs them
//! from a shell, over JSON lines, or behind HTTP endpoints.

pub mod codec;
pub mod domain;
pub mod node;
pub mod server;
pub mod storage;
pub mod cli;

pub use node::{NodeKind, NodeOutput, NodeRequest, NodeResponse, NodeRuntime};
pub use storage::Config;
