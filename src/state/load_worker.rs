//! Background thread for cube loading.
//!
//! Decoding a large cube can take seconds, so loads run on a dedicated thread
//! that owns its own [`LoaderRegistry`]. Every request gets a monotonically
//! increasing [`LoadToken`]; issuing a new request supersedes all earlier
//! ones. Superseded work is abandoned at the next checkpoint and reported as
//! [`EngineError::Cancelled`].

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::session::LoadedCube;
use crate::data::{AxisOrder, LoaderRegistry};
use crate::error::{EngineError, Result};

/// Identifies one load request. Later requests have larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Raw counter value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// What to load and how to read its axes.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// File or directory to load
    pub path: PathBuf,
    /// UI format tag (e.g. "npy", "hdr")
    pub tag: String,
    /// Declared on-disk axis order
    pub axis_order: AxisOrder,
}

/// Completed (or abandoned) request, sent back from the worker thread.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Token of the request this answers
    pub token: LoadToken,
    /// Standardized cube or the reason there is none
    pub result: Result<LoadedCube>,
}

/// Message sent to the worker thread.
enum ThreadMessage {
    /// Load a cube
    Load(LoadToken, LoadRequest),
    /// Shutdown the thread
    Shutdown,
}

/// Manages the background load thread.
pub struct LoadWorker {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for results from the background thread
    result_rx: Receiver<LoadOutcome>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    /// Most recently issued token, shared with the thread
    latest: Arc<AtomicU64>,
}

impl LoadWorker {
    /// Spawn a worker with all built-in loaders.
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(LoaderRegistry::new())
    }

    /// Spawn a worker that loads through `registry`.
    pub fn spawn_with(registry: LoaderRegistry) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<LoadOutcome>();
        let latest = Arc::new(AtomicU64::new(0));
        let thread_latest = Arc::clone(&latest);

        let thread_handle = thread::Builder::new()
            .name("cube-loader".to_string())
            .spawn(move || {
                log::debug!("Cube loader thread started");
                Self::thread_loop(&registry, &thread_latest, request_rx, result_tx);
                log::debug!("Cube loader thread exiting");
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            latest,
        })
    }

    /// Background thread main loop.
    fn thread_loop(
        registry: &LoaderRegistry,
        latest: &AtomicU64,
        request_rx: Receiver<ThreadMessage>,
        result_tx: Sender<LoadOutcome>,
    ) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Load(token, request)) => {
                    let result = Self::run(registry, latest, token, &request);
                    if result_tx.send(LoadOutcome { token, result }).is_err() {
                        log::warn!("Result channel closed, loader thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, loader thread exiting");
                    break;
                }
            }
        }
    }

    /// Decode and standardize, checking for a newer request around the decode.
    fn run(
        registry: &LoaderRegistry,
        latest: &AtomicU64,
        token: LoadToken,
        request: &LoadRequest,
    ) -> Result<LoadedCube> {
        let superseded = || latest.load(Ordering::Acquire) != token.0;

        if superseded() {
            log::debug!("Skipping superseded load {}", token.0);
            return Err(EngineError::Cancelled { token: token.0 });
        }

        let raw = registry.load_tag(&request.path, &request.tag)?;

        if superseded() {
            log::debug!("Dropping superseded load {} after decode", token.0);
            return Err(EngineError::Cancelled { token: token.0 });
        }

        LoadedCube::from_raw(raw, request.axis_order)
    }

    /// Queue a load; any earlier request is superseded.
    pub fn request(&mut self, request: LoadRequest) -> LoadToken {
        let token = LoadToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1);

        if self
            .request_tx
            .send(ThreadMessage::Load(token, request))
            .is_err()
        {
            log::error!("Failed to send load request: channel closed");
        } else {
            log::debug!("Sent load request {}", token.0);
        }
        token
    }

    /// Token of the most recent request, if any was made.
    pub fn latest_token(&self) -> Option<LoadToken> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            value => Some(LoadToken(value)),
        }
    }

    /// Take one finished outcome without blocking.
    pub fn try_result(&mut self) -> Option<LoadOutcome> {
        match self.result_rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Loader thread disconnected");
                None
            }
        }
    }

    /// Block until the next outcome arrives.
    pub fn wait_result(&mut self) -> Option<LoadOutcome> {
        self.result_rx.recv().ok()
    }

    /// Block for at most `timeout`.
    pub fn wait_result_timeout(&mut self, timeout: Duration) -> Option<LoadOutcome> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Loader thread disconnected");
                None
            }
        }
    }
}

impl Drop for LoadWorker {
    fn drop(&mut self) {
        log::debug!("Shutting down cube loader thread");

        // anything still running is abandoned at its next checkpoint
        self.latest.fetch_add(1, Ordering::AcqRel);
        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Loader thread panicked: {:?}", e);
            }
        }
    }
}
