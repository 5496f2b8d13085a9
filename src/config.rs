use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "setup.json";
const DEFAULT_PLAYLIST_FILE: &str = "playlists.json";

/// Where the playlist document lives
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playlist_directory: PathBuf,
    pub playlist_file: String,
}

impl Default for Config {
    fn default() -> Self {
        let documents = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            playlist_directory: documents.join("PlaylistManager"),
            playlist_file: DEFAULT_PLAYLIST_FILE.to_string(),
        }
    }
}

impl Config {
    /// Reads `path`, writing the defaults there on first run.
    ///
    /// A broken config file is not fatal: the defaults are used and a warning
    /// is logged.
    pub fn load_or_init(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                match config.save(path) {
                    Ok(()) => info!(path = %path.display(), "wrote default config"),
                    Err(e) => warn!(path = %path.display(), error = %e, "could not write default config"),
                }
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
    }

    /// Full path of the playlist document; creates its directory.
    pub fn playlist_path(&self) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.playlist_directory)?;
        Ok(self.playlist_directory.join(&self.playlist_file))
    }
}
