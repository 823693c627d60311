//! pipo - Utility nodes for node-graph workflows

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = pipo_nodes::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
