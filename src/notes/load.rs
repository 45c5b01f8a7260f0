use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::model::{MapMetadata, Workspace};
use super::parse::{parse_capture_file, parse_metadata};

const DEMO_BUNDLE: &str = include_str!("demo.json");

#[derive(Clone, Debug, Default)]
pub struct NoteSource {
    pub notes_path: Option<PathBuf>,
    pub map_path: Option<PathBuf>,
}

impl NoteSource {
    pub fn describe(&self) -> String {
        self.notes_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in demo".to_owned())
    }
}

pub fn load_workspace(source: &NoteSource) -> Result<Workspace> {
    let raw = match &source.notes_path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read notes from {}", path.display()))?,
        None => DEMO_BUNDLE.to_owned(),
    };

    let (notes, embedded) = parse_capture_file(&raw)
        .with_context(|| format!("failed to parse notes from {}", source.describe()))?;
    debug!(notes = notes.len(), embedded_map = embedded.is_some(), "parsed notes");

    // A broken metadata file degrades to whatever came with the notes.
    let metadata = match &source.map_path {
        Some(path) => match load_metadata(path) {
            Ok(metadata) => Some(metadata),
            Err(error) => {
                warn!(path = %path.display(), "mind map metadata unavailable: {error:#}");
                embedded
            }
        },
        None => embedded,
    };

    Ok(Workspace { notes, metadata })
}

fn load_metadata(path: &Path) -> Result<MapMetadata> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read mind map metadata from {}", path.display()))?;
    parse_metadata(&raw)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn demo_bundle_has_notes_and_metadata() {
        let workspace = load_workspace(&NoteSource::default()).unwrap();
        assert!(workspace.notes.len() >= 2);
        let metadata = workspace.metadata.unwrap();
        assert_eq!(metadata.nodes.len(), workspace.notes.len());
        assert!(!metadata.links.is_empty());
    }

    #[test]
    fn missing_notes_file_is_an_error() {
        let source = NoteSource {
            notes_path: Some(PathBuf::from("/definitely/not/here.json")),
            map_path: None,
        };
        let error = load_workspace(&source).unwrap_err();
        assert!(format!("{error:#}").contains("failed to read notes"));
    }

    #[test]
    fn unreadable_map_falls_back_to_embedded_metadata() {
        let source = NoteSource {
            notes_path: None,
            map_path: Some(PathBuf::from("/definitely/not/here.json")),
        };
        let workspace = load_workspace(&source).unwrap();
        assert!(workspace.metadata.is_some());
    }

    #[test]
    fn map_file_overrides_embedded_metadata() {
        let mut notes = tempfile::NamedTempFile::new().unwrap();
        write!(
            notes,
            r#"[{{"id": "a", "text": "one"}}, {{"id": "b", "text": "two"}}]"#
        )
        .unwrap();
        let mut map = tempfile::NamedTempFile::new().unwrap();
        write!(
            map,
            r#"{{"nodes": [{{"id": "a", "significance": 9}}], "links": []}}"#
        )
        .unwrap();

        let workspace = load_workspace(&NoteSource {
            notes_path: Some(notes.path().to_path_buf()),
            map_path: Some(map.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(workspace.notes.len(), 2);
        let metadata = workspace.metadata.unwrap();
        assert_eq!(metadata.nodes.len(), 1);
        assert_eq!(metadata.nodes[0].significance, 9.0);
    }
}
