use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::model::{MapMetadata, Note};

#[derive(Deserialize)]
#[serde(untagged)]
enum CaptureFile {
    Bundle {
        captures: Vec<Note>,
        #[serde(default, rename = "mindMap")]
        mind_map: Option<MapMetadata>,
    },
    Notes(Vec<Note>),
}

/// Accepts either a bare array of notes or a bundle carrying `captures` and
/// an optional embedded `mindMap`.
pub(super) fn parse_capture_file(raw: &str) -> Result<(Vec<Note>, Option<MapMetadata>)> {
    let parsed: CaptureFile = serde_json::from_str(raw)
        .map_err(|error| anyhow!("expected a note array or a capture bundle: {error}"))?;

    Ok(match parsed {
        CaptureFile::Bundle { captures, mind_map } => (captures, mind_map),
        CaptureFile::Notes(notes) => (notes, None),
    })
}

pub(super) fn parse_metadata(raw: &str) -> Result<MapMetadata> {
    serde_json::from_str(raw).context("invalid mind map metadata JSON")
}
