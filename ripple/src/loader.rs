//! Convenience loaders shared by `ripple-cli` and `ripple-server`: reading a
//! workspace document off disk or resolving `sample=<name>` to one of the
//! bundled samples. These return `anyhow::Result` rather than
//! `ripple::Error` — this module sits at the I/O boundary, not in the
//! engine's own fallible API.

use std::path::Path;

use anyhow::{Context, Result};
use ripple_types::WorkspaceConfig;

/// One entry of `GET /samples`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SampleInfo {
    pub name: String,
    pub description: String,
}

const ACQUISITION_FAILURE: &str = include_str!("../samples/acquisition_failure.json");
const SUPPLY_CHAIN_EXPOSURE: &str = include_str!("../samples/supply_chain_exposure.json");
const PRIVATE_BANKING: &str = include_str!("../samples/private_banking.json");

fn samples() -> &'static [(&'static str, &'static str)] {
    &[
        ("acquisition_failure", ACQUISITION_FAILURE),
        ("supply_chain_exposure", SUPPLY_CHAIN_EXPOSURE),
        ("private_banking", PRIVATE_BANKING),
    ]
}

/// Names and descriptions of every bundled sample, for `GET /samples`.
pub fn list_samples() -> Vec<SampleInfo> {
    samples()
        .iter()
        .filter_map(|(name, raw)| {
            let config: WorkspaceConfig = serde_json::from_str(raw).ok()?;
            Some(SampleInfo {
                name: name.to_string(),
                description: config.metadata.description.unwrap_or_default(),
            })
        })
        .collect()
}

/// Resolves `sample=<name>` to a bundled workspace document.
pub fn load_sample(name: &str) -> Result<WorkspaceConfig> {
    let raw = samples()
        .iter()
        .find(|(sample_name, _)| *sample_name == name)
        .map(|(_, raw)| *raw)
        .with_context(|| format!("unknown sample '{name}'"))?;
    parse_workspace_json(raw)
}

/// Reads and parses a workspace document from a file path.
pub fn load_workspace_file(path: &Path) -> Result<WorkspaceConfig> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read workspace file {}", path.display()))?;
    parse_workspace_json(&raw)
}

pub fn parse_workspace_json(raw: &str) -> Result<WorkspaceConfig> {
    serde_json::from_str(raw).context("workspace document is not valid JSON for the expected schema")
}
