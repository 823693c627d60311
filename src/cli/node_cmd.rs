//! Node catalogue and execution commands

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::output::Output;
use crate::node::{NodeKind, NodeRequest, NodeResponse, NodeRuntime};
use crate::storage::Config;

/// Lists every node with its category and outputs
pub fn list(output: &Output) -> Result<()> {
    if output.is_json() {
        let nodes: Vec<_> = NodeKind::ALL.iter().map(|kind| kind.info()).collect();
        output.data(&nodes);
        return Ok(());
    }

    for kind in NodeKind::ALL {
        let marker = if kind.always_execute() { "*" } else { "" };
        let name = format!("{}{}", kind.class_name(), marker);
        let outputs = kind.return_names().join(", ");
        output.row(&[name.as_str(), kind.category(), outputs.as_str()]);
    }
    output.text("");
    output.text("* runs on every pass");
    Ok(())
}

/// Runs one node and prints its output
pub fn run(output: &Output, config: &Config, node: &str, id: Option<String>, inputs: &str) -> Result<()> {
    let kind: NodeKind = node.parse()?;
    let inputs: Value = serde_json::from_str(inputs).context("Inputs must be a JSON object")?;

    let runtime = NodeRuntime::from_config(config);
    let mut request = NodeRequest::new(kind.class_name(), inputs);
    request.unique_id = id;

    let response = runtime.execute(&request);
    if output.is_json() {
        output.data(&response);
        return Ok(());
    }

    match (response.data, response.error) {
        (Some(data), _) => {
            for (name, value) in kind.return_names().iter().zip(&data.result) {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                output.row(&[*name, value.as_str()]);
            }
            Ok(())
        }
        (None, Some(error)) => bail!(error),
        (None, None) => bail!("Node returned no output"),
    }
}

fn respond(line: &str, runtime: &NodeRuntime) -> NodeResponse {
    match serde_json::from_str::<NodeRequest>(line) {
        Ok(request) => runtime.execute(&request),
        Err(e) => NodeResponse::error(format!("Invalid request: {}", e)),
    }
}

/// Serves JSON-lines requests from stdin until EOF
///
/// Responses are always JSON, one per request line, in order.
pub fn exec(config: &Config) -> Result<()> {
    let runtime = NodeRuntime::from_config(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = respond(&line, &runtime);
        serde_json::to_writer(&mut out, &response).context("Failed to write response")?;
        writeln!(out).context("Failed to write response")?;
        out.flush().context("Failed to write response")?;
    }
    Ok(())
}
