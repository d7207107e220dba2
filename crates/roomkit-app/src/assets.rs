//! Asset manifest backed loader.

use anyhow::Context;
use roomkit_core::placement::AssetResult;
use roomkit_core::{AssetError, AssetLoader, AssetPart, AssetRequest, BoxFuture, BoxSize, ResolvedAsset, Timer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// One mesh file and its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFile {
    pub path: String,
    pub size: BoxSize,
}

/// Assets for one kind. Composite kinds also carry a lower mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub primary: AssetFile,
    #[serde(default)]
    pub secondary: Option<AssetFile>,
    /// Simulated fetch latency.
    #[serde(default)]
    pub delay_ms: u64,
}

/// Asset kinds mapped to mesh files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub assets: HashMap<String, ManifestEntry>,
}

impl AssetManifest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading asset manifest {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("parsing asset manifest {}", path.display()))
    }

    fn lookup(&self, request: &AssetRequest) -> AssetResult<(&AssetFile, u64)> {
        let entry = self
            .assets
            .get(request.kind.as_str())
            .ok_or_else(|| AssetError::NotFound(request.kind.to_string()))?;
        let file = match request.part {
            AssetPart::Primary => &entry.primary,
            AssetPart::Secondary => entry
                .secondary
                .as_ref()
                .ok_or_else(|| AssetError::NotFound(format!("{} (secondary)", request.kind)))?,
        };
        Ok((file, entry.delay_ms))
    }
}

/// Resolves requests against an [`AssetManifest`]. The handle is the mesh path.
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader {
    manifest: AssetManifest,
}

impl ManifestLoader {
    pub fn new(manifest: AssetManifest) -> Self {
        Self { manifest }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(AssetManifest::from_path(path)?))
    }
}

impl AssetLoader for ManifestLoader {
    type Handle = String;

    fn resolve(&self, request: &AssetRequest) -> BoxFuture<'_, AssetResult<ResolvedAsset<String>>> {
        let lookup = self
            .manifest
            .lookup(request)
            .map(|(file, delay_ms)| (file.clone(), delay_ms));
        Box::pin(async move {
            let (file, delay_ms) = lookup?;
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            log::debug!("resolved {} ({} wide)", file.path, file.size.width);
            Ok::<_, AssetError>(ResolvedAsset {
                size: file.size,
                handle: file.path,
            })
        })
    }
}

/// [`Timer`] on the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
