//! # Node Layer
//!
//! Host-facing surface of the node pack.
//!
//! ## Overview
//!
//! The graph engine is external. It names a node by class name, passes its
//! inputs as a JSON object and gets back the node output:
//!
//! ```text
//! Host                               NodeRuntime
//!  │                                     │
//!  ├── {"node": "MF_ShotHelper", "unique_id": "4", "inputs": {"step": 7, "beats": "3,8"}}
//!  │                                     │
//!  └── {"success": true, "data": {"result": [2, "2", 5, "5", "seq02_shot05"]}}
//! ```
//!
//! Unknown nodes and malformed inputs fail the request. Failures inside a node
//! (missing files, out-of-range indexes) are reported as the node's result
//! value so the rest of the graph keeps running.
//!
//! ## Stateful Nodes
//!
//! | Node | State | Lifetime |
//! |------|-------|----------|
//! | `MF_ModuloAdvanced` | cycle counter per `unique_id` | process |
//! | `MF_GraphPlotter` | point series per `unique_id` | snapshot file |
//! | `MF_StoryDriver` | step and seed per project | snapshot file |
//!
//! ## Key Types
//!
//! - [`NodeKind`] - The node catalogue and its re-execute contract
//! - [`NodeRuntime`] - Runs nodes against the injected stores
//! - [`NodeRequest`] / [`NodeResponse`] - Wire types

mod protocol;
mod registry;
mod runtime;

use thiserror::Error;

use crate::domain::ModuloError;

pub use protocol::{NodeOutput, NodeRequest, NodeResponse};
pub use registry::{NodeInfo, NodeKind};
pub use runtime::NodeRuntime;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Unknown node '{0}'")]
    UnknownNode(String),

    #[error("Invalid inputs for {node}: {source}")]
    InvalidInputs {
        node: NodeKind,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Modulo(#[from] ModuloError),
}
