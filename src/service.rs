use std::path::Path;

use tracing::warn;

use crate::error::{Result, ValidationError};
use crate::player::{AudioEngine, Gateway, PlaybackState};
use crate::store::PlaylistStore;
use crate::track::Track;

/// What the front end talks to: playlists on disk plus one playback slot.
pub struct PlaylistService<E: AudioEngine> {
    store: PlaylistStore,
    gateway: Gateway<E>,
}

impl<E: AudioEngine> PlaylistService<E> {
    pub fn new(store: PlaylistStore, gateway: Gateway<E>) -> Self {
        Self { store, gateway }
    }

    /// Checks every track first; one bad track means nothing is written.
    pub fn save_playlist(&self, name: &str, tracks: &[Track]) -> Result<()> {
        for track in tracks {
            self.check_track(track)?;
        }
        self.store.save(name, tracks)
    }

    // loaded tracks are not re-validated, a vanished file shows up when it is played
    pub fn load_playlist(&self, name: &str) -> Result<Vec<Track>> {
        self.store.load(name)
    }

    pub fn playlist_names(&self) -> Result<Vec<String>> {
        self.store.list_names()
    }

    pub fn play_track(&mut self, path: &Path, volume: f64) -> Result<()> {
        check_volume(path, volume)?;
        Ok(self.gateway.play(path, volume)?)
    }

    pub fn stop_playback(&mut self) {
        self.gateway.stop();
    }

    /// Changes the gain of the playing track; does nothing when idle.
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        if let Some(path) = self.gateway.current() {
            check_volume(path, volume)?;
        }
        self.gateway.set_volume(volume);
        Ok(())
    }

    pub fn playback(&self) -> &PlaybackState {
        self.gateway.state()
    }

    pub fn playback_finished(&self) -> bool {
        self.gateway.is_finished()
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    fn check_track(&self, track: &Track) -> std::result::Result<(), ValidationError> {
        let path = track.path();
        check_volume(path, track.volume)?;
        if !self.gateway.validate(path) {
            warn!(path = %path.display(), "rejected non-audio track");
            return Err(ValidationError::UnreadableAudio {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

// louder than 1.0 is fine, NaN and negative gains are not
fn check_volume(path: &Path, volume: f64) -> std::result::Result<(), ValidationError> {
    if volume.is_finite() && volume >= 0.0 {
        return Ok(());
    }
    warn!(path = %path.display(), volume, "rejected volume");
    Err(ValidationError::InvalidVolume {
        path: path.to_path_buf(),
        volume,
    })
}
