//! Local audio output.
//!
//! [`RodioEngine`] owns the output stream for the whole session and at most
//! one sink. It is created once at startup and released when dropped.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::error::LoadError;

/// Single-file playback capability used by the local controller.
pub trait AudioEngine {
    /// Decode `path` into a paused sink, replacing the current one on success.
    fn load(&mut self, path: &Path) -> Result<(), LoadError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn unpause(&mut self);
    fn stop(&mut self);
    /// `volume` is in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);
}

pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open_default(volume: f32) -> Result<Self, rodio::StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio prints to stderr when the stream is dropped, which would land
        // on top of the restored terminal.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            volume,
        })
    }
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

impl AudioEngine for RodioEngine {
    fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        // Decode first so a bad file leaves the current sink untouched.
        let source = decode(path)?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        log::debug!("loaded {}", path.display());
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn unpause(&mut self) {
        self.play();
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }
}
