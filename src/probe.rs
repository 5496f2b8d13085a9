//! Container inspection with symphonia, used to decide whether a file is audio
//! before it goes into a playlist.
//!
//! rodio is built on the same symphonia registries, so a stream classified as
//! audio here is one the playback engine can decode.

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Other,
}

/// Probes `path` and classifies every stream in the container.
pub fn probe_streams(path: &Path) -> Result<Vec<StreamKind>, SymphoniaError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    Ok(probed.format.tracks().iter().map(classify).collect())
}

// a stream counts as audio only if a decoder can actually be built for it
fn classify(track: &Track) -> StreamKind {
    let params = &track.codec_params;
    if params.codec == CODEC_TYPE_NULL || params.sample_rate.is_none() {
        return StreamKind::Other;
    }
    match symphonia::default::get_codecs().make(params, &DecoderOptions::default()) {
        Ok(_) => StreamKind::Audio,
        Err(_) => StreamKind::Other,
    }
}
