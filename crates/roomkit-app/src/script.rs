//! Scripted pointer input for headless runs.

use anyhow::Context;
use roomkit_core::{FloorCamera, PointerEvent};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A recorded pointer gesture sequence and the camera it was recorded with.
#[derive(Debug, Clone, Deserialize)]
pub struct PointerScript {
    #[serde(default)]
    pub camera: FloorCamera,
    pub events: Vec<PointerEvent>,
}

impl PointerScript {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let script: Self = serde_json::from_str(json)?;
        if script.events.is_empty() {
            anyhow::bail!("pointer script contains no events");
        }
        Ok(script)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading pointer script {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("parsing pointer script {}", path.display()))
    }
}
