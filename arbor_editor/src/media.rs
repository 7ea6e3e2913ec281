// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Media collaborators: acquisition, storage, playback.
//!
//! These run beside the document, never inside it. Acquisition fetches a
//! URL into the managed directory on a worker thread and reports back over
//! a channel drained on the control thread ([`MediaWorker::poll`]); the
//! worker has no access to the document and nothing model-visible happens
//! until the control thread sees the completion event. Failures become
//! notices; they cannot corrupt document state because they never touch it.
//!
//! There is no cancellation: an in-flight fetch runs to completion and its
//! event is simply reported whenever it arrives.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;

use regex::Regex;
use tracing::{debug, warn};

/// Errors from media acquisition, storage, or playback.
#[derive(Debug)]
pub enum MediaError {
    /// File or directory I/O failure.
    Io(std::io::Error),
    /// The source could not produce the asset.
    Fetch(String),
    /// The player rejected the asset or operation.
    Playback(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Fetch(msg) => write!(f, "fetch failed: {msg}"),
            Self::Playback(msg) => write!(f, "playback failed: {msg}"),
        }
    }
}

impl std::error::Error for MediaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Fetch(_) | Self::Playback(_) => None,
        }
    }
}

impl From<std::io::Error> for MediaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Fetches a URL into the managed directory. Implementations run on worker
/// threads and must not touch editor state.
pub trait MediaSource: Send + Sync {
    /// Fetch `url` and store the playable result under `dest_dir`,
    /// returning the stored file's path.
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, MediaError>;
}

/// Plays stored assets. Control-thread only; stateless with respect to the
/// document.
pub trait MediaPlayer {
    /// Prepare a stored asset for playback.
    fn load(&mut self, asset: &Path) -> Result<(), MediaError>;
    /// Start playing the loaded asset.
    fn play(&mut self) -> Result<(), MediaError>;
    /// Stop playback. Always succeeds; stopping silence is fine.
    fn stop(&mut self);
}

static MEDIA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:youtube\.com|youtu\.be)/\S+")
        .expect("media url pattern is valid")
});

/// The first recognizable media URL in free-form memo text, if any.
pub fn extract_media_url(text: &str) -> Option<&str> {
    MEDIA_URL.find(text).map(|m| m.as_str())
}

/// The managed asset directory.
///
/// Created on demand; listings are limited to playable files (`.mp3`).
#[derive(Clone, Debug)]
pub struct MediaLibrary {
    dir: PathBuf,
}

impl MediaLibrary {
    /// A library rooted at `dir`. Nothing is created until first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The managed directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the managed directory if it is missing.
    pub fn ensure_dir(&self) -> Result<(), MediaError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// All stored playable assets, unordered. Empty when the directory
    /// does not exist yet.
    pub fn assets(&self) -> Result<Vec<PathBuf>, MediaError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let playable = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
            if playable {
                out.push(path);
            }
        }
        Ok(out)
    }

    /// The most recently stored asset, if any.
    pub fn newest(&self) -> Result<Option<PathBuf>, MediaError> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for path in self.assets()? {
            let modified = fs::metadata(&path)?.modified()?;
            let newer = match &newest {
                Some((best, _)) => modified > *best,
                None => true,
            };
            if newer {
                newest = Some((modified, path));
            }
        }
        Ok(newest.map(|(_, path)| path))
    }
}

/// Completion events delivered back to the control thread.
#[derive(Debug)]
pub enum MediaEvent {
    /// A fetch finished; the asset is stored in the library.
    Fetched {
        /// The URL that was fetched.
        url: String,
        /// Where the asset landed.
        asset: PathBuf,
    },
    /// A fetch failed. Non-fatal; nothing was stored.
    FetchFailed {
        /// The URL that failed.
        url: String,
        /// Human-readable reason.
        error: String,
    },
}

/// Off-thread media acquisition with on-thread completion delivery.
pub struct MediaWorker {
    source: Arc<dyn MediaSource>,
    library: MediaLibrary,
    tx: Sender<MediaEvent>,
    rx: Receiver<MediaEvent>,
    in_flight: Arc<AtomicUsize>,
}

impl fmt::Debug for MediaWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaWorker")
            .field("library", &self.library)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl MediaWorker {
    /// A worker storing fetches from `source` into `library`.
    pub fn new(source: Arc<dyn MediaSource>, library: MediaLibrary) -> Self {
        let (tx, rx) = channel();
        Self {
            source,
            library,
            tx,
            rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The library fetches land in.
    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Number of fetches started but not yet reported.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Start fetching `url` on a worker thread.
    ///
    /// Returns immediately; the outcome arrives through
    /// [`MediaWorker::poll`].
    pub fn fetch(&self, url: &str) {
        let source = Arc::clone(&self.source);
        let dir = self.library.dir().to_path_buf();
        let tx = self.tx.clone();
        let url = url.to_owned();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::Relaxed);
        debug!(url = %url, "media fetch started");
        thread::spawn(move || {
            let event = match source.fetch(&url, &dir) {
                Ok(asset) => MediaEvent::Fetched { url, asset },
                Err(err) => {
                    warn!(error = %err, "media fetch failed");
                    MediaEvent::FetchFailed {
                        url,
                        error: err.to_string(),
                    }
                }
            };
            in_flight.fetch_sub(1, Ordering::Relaxed);
            // The receiver may be gone during shutdown; nothing to do then.
            let _ = tx.send(event);
        });
    }

    /// Drain completion events. Call from the control thread; never
    /// blocks.
    pub fn poll(&self) -> Vec<MediaEvent> {
        self.rx.try_iter().collect()
    }
}

/// A player that remembers what it was told, for headless use and tests.
#[derive(Debug, Default)]
pub struct NullPlayer {
    loaded: Option<PathBuf>,
    playing: bool,
}

impl NullPlayer {
    /// A player with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// The asset most recently loaded.
    pub fn loaded(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    /// Whether play was called more recently than stop.
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaPlayer for NullPlayer {
    fn load(&mut self, asset: &Path) -> Result<(), MediaError> {
        self.loaded = Some(asset.to_path_buf());
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if self.loaded.is_none() {
            return Err(MediaError::Playback("nothing loaded".into()));
        }
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}
