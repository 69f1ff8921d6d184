use anyhow::{Context, Result};
use log::{debug, warn};
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
#[cfg(unix)]
use std::ffi::CString;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Playback of the track currently under review. Both calls return at once;
/// audio keeps running in the background until `stop` or the next `play`.
pub trait AudioEngine {
    fn play(&mut self, path: &Path) -> Result<()>;
    fn stop(&mut self);
    fn current_track(&self) -> Option<&Path>;
}

/// Opens the system output, falling back to a silent engine when no device
/// can be started.
pub fn open_default() -> Box<dyn AudioEngine> {
    match RodioAudioEngine::new() {
        Ok(engine) => Box::new(engine),
        Err(err) => {
            warn!("audio output unavailable, playback disabled: {err:#}");
            Box::new(NullAudioEngine::new())
        }
    }
}

pub struct RodioAudioEngine {
    stream: OutputStream,
    sink: Sink,
    current: Option<PathBuf>,
}

impl RodioAudioEngine {
    pub fn new() -> Result<Self> {
        let (stream, sink) = Self::open_output_stream()?;
        Ok(Self {
            stream,
            sink,
            current: None,
        })
    }

    fn open_output_stream() -> Result<(OutputStream, Sink)> {
        let mut stream = with_silenced_stderr(|| {
            match OutputStreamBuilder::from_default_device()
                .context("failed to open default system output stream")
                .and_then(|builder| {
                    builder
                        .with_error_callback(|_| {})
                        .open_stream_or_fallback()
                        .context("failed to start default output stream")
                }) {
                Ok(stream) => Ok(stream),
                Err(default_err) => {
                    let host = rodio::cpal::default_host();
                    let devices = host
                        .output_devices()
                        .context("failed to enumerate output devices")?;
                    for device in devices {
                        let name = device.name().unwrap_or_default();
                        let opened = OutputStreamBuilder::from_device(device)
                            .context("failed to open fallback output device")
                            .and_then(|builder| {
                                builder
                                    .with_error_callback(|_| {})
                                    .open_stream_or_fallback()
                                    .context("failed to start fallback output stream")
                            });
                        if let Ok(stream) = opened {
                            debug!("using fallback audio output {name}");
                            return Ok(stream);
                        }
                    }
                    Err(default_err.context("no audio output stream could be started"))
                }
            }
        })?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());
        Ok((stream, sink))
    }
}

impl AudioEngine for RodioAudioEngine {
    fn play(&mut self, path: &Path) -> Result<()> {
        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.current = None;

        let file =
            File::open(path).with_context(|| format!("failed to open track {}", path.display()))?;
        let source = Decoder::try_from(file)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        self.sink.append(source);
        self.current = Some(path.to_path_buf());
        debug!("playing {}", path.display());
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.current = None;
    }

    fn current_track(&self) -> Option<&Path> {
        self.current.as_deref()
    }
}

#[cfg(unix)]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved < 0 {
        return operation();
    }

    let devnull = CString::new("/dev/null")
        .ok()
        .map(|path| unsafe { libc::open(path.as_ptr(), libc::O_WRONLY) })
        .unwrap_or(-1);

    if devnull >= 0 {
        unsafe {
            libc::dup2(devnull, libc::STDERR_FILENO);
            libc::close(devnull);
        }
    }

    let result = operation();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }

    result
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    operation()
}

/// Keeps track of what would be playing without touching an output device.
#[derive(Debug, Default)]
pub struct NullAudioEngine {
    current: Option<PathBuf>,
}

impl NullAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioEngine for NullAudioEngine {
    fn play(&mut self, path: &Path) -> Result<()> {
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn stop(&mut self) {
        self.current = None;
    }

    fn current_track(&self) -> Option<&Path> {
        self.current.as_deref()
    }
}
