use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, info, warn};

use crate::error::{EngineError, PlaybackError};
use crate::probe::{self, StreamKind};

// anything past this starts clipping badly
const MAX_GAIN: f32 = 2.0;

/// What the gateway needs from a playback backend.
///
/// One file at a time: `load` replaces whatever was loaded before.
pub trait AudioEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError>;
    fn set_volume(&mut self, volume: f32);
    fn play(&mut self) -> Result<(), EngineError>;
    fn stop(&mut self);
    /// true once the loaded stream has played to the end (or nothing is loaded)
    fn is_drained(&self) -> bool;
    fn probe(&self, path: &Path) -> Option<Vec<StreamKind>>;
}

/// rodio output with symphonia probing.
///
/// The output device is opened on the first `load`, so an engine that only
/// validates files never touches the sound card.
pub struct RodioEngine {
    // the stream has to outlive the sink or playback goes silent
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl RodioEngine {
    pub fn new() -> Self {
        Self {
            output: None,
            sink: None,
        }
    }

    fn handle(&mut self) -> Result<&OutputStreamHandle, EngineError> {
        let (_, handle) = match self.output {
            Some(ref output) => output,
            None => {
                let output = OutputStream::try_default()?;
                info!("opened default audio output");
                &*self.output.insert(output)
            }
        };
        Ok(handle)
    }
}

impl Default for RodioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for RodioEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        self.stop();
        let source = Decoder::new(BufReader::new(File::open(path)?))?;
        let sink = Sink::try_new(self.handle()?)?;
        sink.pause();
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(gain(volume));
        }
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let sink = self.sink.as_ref().ok_or(EngineError::NothingLoaded)?;
        sink.play();
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_drained(&self) -> bool {
        self.sink.as_ref().map_or(true, |sink| sink.empty())
    }

    fn probe(&self, path: &Path) -> Option<Vec<StreamKind>> {
        match probe::probe_streams(path) {
            Ok(streams) => Some(streams),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "probe failed");
                None
            }
        }
    }
}

// NaN would pass straight through clamp
fn gain(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, MAX_GAIN)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackState {
    Idle,
    Playing(PathBuf),
}

/// Owns the engine and the single "currently playing" slot.
///
/// Not internally synchronized; callers serialize `play` and `stop`.
pub struct Gateway<E: AudioEngine> {
    engine: E,
    state: PlaybackState,
}

impl<E: AudioEngine> Gateway<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
        }
    }

    /// Stops whatever is playing, then starts `path` at `volume`.
    pub fn play(&mut self, path: &Path, volume: f64) -> Result<(), PlaybackError> {
        self.stop();

        let started = self.engine.load(path).and_then(|()| {
            self.engine.set_volume(volume as f32);
            self.engine.play()
        });
        if let Err(source) = started {
            warn!(path = %path.display(), error = %source, "could not start playback");
            self.engine.stop();
            return Err(PlaybackError {
                path: path.to_path_buf(),
                source,
            });
        }

        info!(path = %path.display(), volume, "playing");
        self.state = PlaybackState::Playing(path.to_path_buf());
        Ok(())
    }

    pub fn stop(&mut self) {
        if let PlaybackState::Playing(path) = &self.state {
            self.engine.stop();
            debug!(path = %path.display(), "stopped");
            self.state = PlaybackState::Idle;
        }
    }

    /// Changes the gain of the current track; does nothing when idle.
    pub fn set_volume(&mut self, volume: f64) {
        if self.is_playing() {
            self.engine.set_volume(volume as f32);
        }
    }

    /// True only if the file has at least one audio stream. Never fails.
    pub fn validate(&self, path: &Path) -> bool {
        self.engine
            .probe(path)
            .map_or(false, |streams| streams.contains(&StreamKind::Audio))
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current(&self) -> Option<&Path> {
        match &self.state {
            PlaybackState::Playing(path) => Some(path),
            PlaybackState::Idle => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing(_))
    }

    // the slot stays Playing after the stream runs out, until someone calls stop
    pub fn is_finished(&self) -> bool {
        self.is_playing() && self.engine.is_drained()
    }
}

impl<E: AudioEngine> Drop for Gateway<E> {
    fn drop(&mut self) {
        self.stop();
    }
}
