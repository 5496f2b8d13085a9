use std::path::Path;

use serde::{Deserialize, Serialize};

/// One row of a playlist as it is written to the store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub sequence: u32,
    pub event: String,
    pub name: String,
    pub file_path: String,
    pub volume: f64,
}

impl Track {
    pub fn new(
        sequence: u32,
        event: impl Into<String>,
        name: impl Into<String>,
        file_path: impl Into<String>,
        volume: f64,
    ) -> Self {
        Self {
            sequence,
            event: event.into(),
            name: name.into(),
            file_path: file_path.into(),
            volume,
        }
    }

    // the display name falls back to the file stem, same as an empty row name in the editor
    pub fn from_path(sequence: u32, event: impl Into<String>, path: &Path, volume: f64) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::new(sequence, event, name, path.to_string_lossy(), volume)
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.file_path)
    }
}
