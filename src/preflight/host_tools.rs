//! Host tool availability checks.

use crate::config::ToolchainConfig;
use crate::process;

use super::types::{Check, Subject, Verdict};

/// Check the programs the stages invoke are on PATH.
pub fn check_host_tools(toolchain: &ToolchainConfig) -> Vec<Check> {
    [
        (toolchain.compiler.as_str(), "compiles the program"),
        ("cp", "stages files into the output directory"),
        (toolchain.engine.as_str(), "builds, saves and removes the image"),
    ]
    .into_iter()
    .map(|(tool, purpose)| {
        let subject = Subject::Tool(tool.to_string());
        match process::which(tool) {
            Some(path) => Check::noted(subject, Verdict::Pass, path.to_string_lossy()),
            None => Check::noted(
                subject,
                Verdict::Fail,
                format!("Not found in PATH; it {}", purpose),
            ),
        }
    })
    .collect()
}
