//! Node protocol types
//!
//! A host sends one JSON request per node invocation and receives one JSON
//! response. Successful responses carry the node output: display data for the
//! host UI plus the positional result values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node invocation sent by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRequest {
    /// Class name of the node (e.g., "MF_ShotHelper")
    pub node: String,

    /// Host identity of the node instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,

    /// Named inputs
    #[serde(default)]
    pub inputs: Value,
}

impl NodeRequest {
    pub fn new(node: impl Into<String>, inputs: impl Into<Value>) -> Self {
        Self {
            node: node.into(),
            unique_id: None,
            inputs: inputs.into(),
        }
    }

    pub fn with_unique_id(mut self, id: impl Into<String>) -> Self {
        self.unique_id = Some(id.into());
        self
    }
}

/// What a node hands back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOutput {
    /// Widget payloads keyed by widget name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<Map<String, Value>>,

    /// Result values in output-slot order
    pub result: Vec<Value>,
}

impl NodeOutput {
    pub fn new(result: Vec<Value>) -> Self {
        Self { ui: None, result }
    }

    /// Adds a single-item widget payload, as hosts expect lists per widget
    pub fn with_ui(mut self, widget: &str, value: impl Into<Value>) -> Self {
        self.ui
            .get_or_insert_with(Map::new)
            .insert(widget.to_string(), Value::Array(vec![value.into()]));
        self
    }
}

/// A response to the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResponse {
    /// Whether the node ran
    pub success: bool,

    /// Node output (if success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeOutput>,

    /// Error message (if failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeResponse {
    pub fn success(data: NodeOutput) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
