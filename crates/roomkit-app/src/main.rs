//! RoomKit command-line entry point.

use anyhow::Result;
use clap::Parser;
use roomkit_app::{ManifestLoader, PointerScript, TokioTimer};
use roomkit_core::{EditorConfig, EditorSession, PositionedScene};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lay out furniture in a room and print the resulting scenes", long_about = None)]
struct Args {
    /// Asset manifest (JSON) mapping asset kinds to meshes and bounding boxes
    #[arg(short, long)]
    assets: PathBuf,

    /// Editor configuration (JSON); defaults are used when omitted or invalid
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pointer script (JSON) to replay before placement
    #[arg(short, long)]
    script: Option<PathBuf>,
}

#[derive(Serialize)]
struct SceneOutput {
    floor: PositionedScene,
    room: PositionedScene,
    #[serde(skip_serializing_if = "Option::is_none")]
    placement_error: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    log::info!("Starting RoomKit");

    let args = Args::parse();
    let config = args
        .config
        .as_deref()
        .map(EditorConfig::load_from_path)
        .unwrap_or_default();
    let loader = ManifestLoader::from_path(&args.assets)?;
    let mut session = EditorSession::new(config);

    if let Some(path) = &args.script {
        let script = PointerScript::from_path(path)?;
        for event in script.events {
            match session.handle_pointer(event, &script.camera) {
                Ok(outputs) => outputs.iter().for_each(|output| log::info!("{output:?}")),
                Err(err) => log::warn!("{:?} at {:?} rejected: {err}", event.phase, event.device_position),
            }
        }
        for event in session.take_events() {
            log::debug!("layout changed: {event:?}");
        }
    }

    let report = session.place_furniture(&loader, &TokioTimer).await;
    if let Some(err) = &report.failure {
        log::warn!("placement incomplete: {err}");
    }

    let output = SceneOutput {
        floor: session.floor_scene(),
        room: session.room_scene(&report),
        placement_error: report.failure.as_ref().map(ToString::to_string),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
