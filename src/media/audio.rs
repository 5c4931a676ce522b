use std::path::Path;

#[cfg(feature = "audio")]
use std::{
    fs::File,
    io::BufReader,
    path::PathBuf,
    sync::{Arc, Mutex},
};

#[cfg(feature = "audio")]
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

/// Thin wrapper around the optional audio backend. Every method is a
/// safe no-op when the backend failed to initialize or the music file
/// is absent; missing audio means silence, never an error.
pub struct MusicPlayer {
    #[cfg(feature = "audio")]
    backend: Option<Backend>,
}

#[cfg(feature = "audio")]
struct Backend {
    // Keeps the output device open; playback dies with it.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    path: PathBuf,
    // Shared with the playback workers.
    slot: Arc<PlaybackSlot<Sink>>,
}

/// Holds the active sink behind an epoch counter. A worker captures the
/// epoch before it starts preparing its sink; `take` bumps the epoch, so
/// an install that lost the race against a stop is rejected instead of
/// resurrecting playback.
#[cfg(feature = "audio")]
struct PlaybackSlot<S> {
    inner: Mutex<SlotState<S>>,
}

#[cfg(feature = "audio")]
struct SlotState<S> {
    epoch: u64,
    active: Option<S>,
}

#[cfg(feature = "audio")]
impl<S> PlaybackSlot<S> {
    fn new() -> Self {
        PlaybackSlot {
            inner: Mutex::new(SlotState {
                epoch: 0,
                active: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState<S>> {
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    fn is_active(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Installs a sink prepared under `epoch`. `Ok` carries any replaced
    /// sink; `Err` hands the sink back because a stop intervened.
    fn install(&self, epoch: u64, sink: S) -> Result<Option<S>, S> {
        let mut state = self.lock();
        if state.epoch != epoch {
            return Err(sink);
        }
        Ok(state.active.replace(sink))
    }

    /// Removes the active sink and invalidates any in-flight install.
    fn take(&self) -> Option<S> {
        let mut state = self.lock();
        state.epoch += 1;
        state.active.take()
    }
}

#[cfg(feature = "audio")]
impl MusicPlayer {
    /// Probes the music file and the output device once. Failure of
    /// either leaves the player in its degraded, silent state.
    pub fn new(path: &Path) -> Self {
        if !path.is_file() {
            glib::g_message!("surprise", "no music file at {}", path.display());
            return MusicPlayer { backend: None };
        }
        let backend = match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Backend {
                _stream: stream,
                handle,
                path: path.to_path_buf(),
                slot: Arc::new(PlaybackSlot::new()),
            }),
            Err(err) => {
                glib::g_warning!("surprise", "audio output unavailable: {err}");
                None
            }
        };
        MusicPlayer { backend }
    }

    pub fn is_playing(&self) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|backend| backend.slot.is_active())
    }

    /// Starts looping playback on a detached worker. Fire-and-forget:
    /// the worker only talks to the audio backend's own thread-safe
    /// handles and never touches application state.
    pub fn play_loop(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        let handle = backend.handle.clone();
        let path = backend.path.clone();
        let slot = backend.slot.clone();
        let epoch = slot.epoch();
        std::thread::spawn(move || {
            let source = match File::open(&path)
                .map_err(|err| err.to_string())
                .and_then(|file| {
                    Decoder::new(BufReader::new(file)).map_err(|err| err.to_string())
                }) {
                Ok(decoder) => decoder.repeat_infinite(),
                Err(err) => {
                    glib::g_warning!("surprise", "cannot decode {}: {err}", path.display());
                    return;
                }
            };
            match Sink::try_new(&handle) {
                Ok(sink) => {
                    sink.append(source);
                    match slot.install(epoch, sink) {
                        // A replaced sink keeps playing if merely
                        // dropped, so both paths stop explicitly.
                        Ok(Some(previous)) => previous.stop(),
                        Ok(None) => {}
                        Err(sink) => sink.stop(),
                    }
                }
                Err(err) => {
                    glib::g_warning!("surprise", "cannot start playback: {err}");
                }
            }
        });
    }

    pub fn stop(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Some(sink) = backend.slot.take() {
            sink.stop();
        }
    }
}

#[cfg(not(feature = "audio"))]
impl MusicPlayer {
    pub fn new(_path: &Path) -> Self {
        MusicPlayer {}
    }

    pub fn is_playing(&self) -> bool {
        false
    }

    pub fn play_loop(&self) {}

    pub fn stop(&self) {}
}
