//! RoomKit Application
//!
//! Command-line driver around the layout engine: loads an asset manifest,
//! replays scripted pointer input and prints the resulting scenes.

mod assets;
mod script;

pub use assets::{AssetFile, AssetManifest, ManifestEntry, ManifestLoader, TokioTimer};
pub use script::PointerScript;
