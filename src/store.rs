use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, PersistenceError, Result};
use crate::track::Track;

type Document = Map<String, Value>;

/// JSON file holding every playlist, keyed by name.
///
/// The whole document is rewritten on each save. Nothing guards against two
/// processes writing the same file at once.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    path: PathBuf,
}

impl PlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the entry for `name` with `tracks`, creating the file if needed.
    pub fn save(&self, name: &str, tracks: &[Track]) -> Result<()> {
        let mut document = self.read_document()?.unwrap_or_default();

        let entry = serde_json::to_value(tracks).map_err(|source| PersistenceError::Serialize {
            name: name.to_string(),
            source,
        })?;
        let replaced = document.insert(name.to_string(), entry).is_some();

        self.write_document(&document)?;
        info!(
            playlist = name,
            tracks = tracks.len(),
            replaced,
            "saved playlist"
        );
        Ok(())
    }

    /// Fails with `NotFound` for an unknown name, and with a read error when
    /// the document itself has never been written.
    pub fn load(&self, name: &str) -> Result<Vec<Track>> {
        let mut document = self.read_document()?.ok_or_else(|| PersistenceError::Read {
            path: self.path.clone(),
            source: io::Error::from(ErrorKind::NotFound),
        })?;

        let entry = document
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let tracks: Vec<Track> =
            serde_json::from_value(entry).map_err(|source| PersistenceError::MalformedPlaylist {
                path: self.path.clone(),
                name: name.to_string(),
                source,
            })?;

        debug!(playlist = name, tracks = tracks.len(), "loaded playlist");
        Ok(tracks)
    }

    /// Names in document order. A store that was never written is empty.
    pub fn list_names(&self) -> Result<Vec<String>> {
        let document = self.read_document()?.unwrap_or_default();
        Ok(document.keys().cloned().collect())
    }

    // None when the file does not exist yet
    fn read_document(&self) -> Result<Option<Document>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "playlist store does not exist yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                }
                .into())
            }
        };

        let document = serde_json::from_str(&data).map_err(|source| PersistenceError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(document))
    }

    // serializes fully in memory, then swaps the file in with a rename
    fn write_document(&self, document: &Document) -> Result<()> {
        let serialized = to_pretty_json(document).map_err(|source| PersistenceError::Encode {
            path: self.path.clone(),
            source,
        })?;

        let write_err = |source: io::Error| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let staging = self.staging_path();
        let replaced = fs::write(&staging, serialized).and_then(|()| fs::rename(&staging, &self.path));
        if let Err(e) = replaced {
            // a half written staging file is useless, the old document is still in place
            if staging.is_file() {
                let _ = fs::remove_file(&staging);
            }
            return Err(write_err(e).into());
        }

        debug!(path = %self.path.display(), "wrote playlist store");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }
}

// four space indent, matching files written by earlier versions
fn to_pretty_json<T: Serialize>(data: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, PlaylistStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().join("playlists.json"));
        (dir, store)
    }

    fn party() -> Vec<Track> {
        vec![Track::new(1, "intro", "song.mp3", "/music/song.mp3", 0.8)]
    }

    #[test]
    fn empty_store_lists_nothing() {
        let (_dir, store) = store();
        assert!(store.list_names().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_then_list_then_load() {
        let (_dir, store) = store();
        store.save("Party", &party()).unwrap();

        assert_eq!(store.list_names().unwrap(), vec!["Party".to_string()]);
        assert_eq!(store.load("Party").unwrap(), party());
    }

    #[test]
    fn load_keeps_array_order_and_sequence_values() {
        let (_dir, store) = store();
        let tracks = vec![
            Track::new(3, "", "c", "/c.mp3", 1.0),
            Track::new(1, "", "a", "/a.mp3", 0.5),
            Track::new(1, "encore", "b", "/b.mp3", 1.5),
        ];
        store.save("odd", &tracks).unwrap();
        assert_eq!(store.load("odd").unwrap(), tracks);
    }

    #[test]
    fn load_without_a_document_is_a_read_error() {
        let (_dir, store) = store();
        match store.load("Party") {
            Err(Error::Persistence(PersistenceError::Read { path, source })) => {
                assert_eq!(path, store.path());
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[test]
    fn missing_name_is_not_found() {
        let (_dir, store) = store();
        fs::write(store.path(), "{}").unwrap();
        assert!(matches!(store.load("nonexistent"), Err(Error::NotFound(_))));

        store.save("Party", &party()).unwrap();
        match store.load("nonexistent") {
            Err(Error::NotFound(name)) => assert_eq!(name, "nonexistent"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn saving_twice_is_idempotent() {
        let (_dir, store) = store();
        store.save("Party", &party()).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();
        store.save("Party", &party()).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn overwrite_replaces_without_merging() {
        let (_dir, store) = store();
        store.save("Party", &party()).unwrap();
        let replacement = vec![Track::new(1, "", "other", "/music/other.ogg", 0.3)];
        store.save("Party", &replacement).unwrap();
        assert_eq!(store.load("Party").unwrap(), replacement);
    }

    #[test]
    fn saving_one_playlist_leaves_others_alone() {
        let (_dir, store) = store();
        // extra fields written by someone else survive a rewrite of another entry
        fs::write(
            store.path(),
            r#"{"B": [{"sequence": 1, "event": "", "name": "b", "file_path": "/b.wav", "volume": 1.0, "extra": true}]}"#,
        )
        .unwrap();
        let before: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();

        store.save("A", &party()).unwrap();

        let after: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(before["B"], after["B"]);
        assert_eq!(store.list_names().unwrap(), vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn corrupt_document_is_a_persistence_error() {
        let (_dir, store) = store();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.list_names(), Err(Error::Persistence(PersistenceError::Corrupt { .. }))));
        assert!(matches!(store.load("Party"), Err(Error::Persistence(_))));
        assert!(matches!(store.save("Party", &party()), Err(Error::Persistence(_))));
        // the broken file is not replaced
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn malformed_entry_is_a_persistence_error() {
        let (_dir, store) = store();
        fs::write(store.path(), r#"{"Party": [{"sequence": "one"}]}"#).unwrap();
        assert!(matches!(
            store.load("Party"),
            Err(Error::Persistence(PersistenceError::MalformedPlaylist { .. }))
        ));
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().join("nested").join("deeper").join("p.json"));
        store.save("Party", &party()).unwrap();
        assert_eq!(store.load("Party").unwrap(), party());
        assert!(!store.staging_path().exists());
    }

    #[test]
    fn writes_four_space_indent() {
        let (_dir, store) = store();
        store.save("Party", &party()).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n    \"Party\": ["));
    }

    #[test]
    fn failed_write_keeps_previous_document() {
        let (_dir, store) = store();
        store.save("Party", &party()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        // a directory squatting on the staging name makes the write fail
        fs::create_dir(store.staging_path()).unwrap();
        let replacement = vec![Track::new(1, "", "other", "/music/other.ogg", 0.3)];

        assert!(matches!(
            store.save("Party", &replacement),
            Err(Error::Persistence(PersistenceError::Write { .. }))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
        assert_eq!(store.load("Party").unwrap(), party());
        assert!(store.staging_path().is_dir());
    }

    #[test]
    fn failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("playlists.json");
        // renaming a file over a non-empty directory fails after the staging write succeeded
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();
        let store = PlaylistStore::new(&target);

        let result = store.write_document(&Document::new());

        assert!(matches!(result, Err(Error::Persistence(PersistenceError::Write { .. }))));
        assert!(!store.staging_path().exists());
        assert!(target.join("keep").is_file());
    }
}
