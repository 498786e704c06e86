use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::debug;

use super::FileSource;

/// Ways a text decode can end without producing text.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {origin}")]
    Read {
        origin: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to start text decoder")]
    Spawn(#[source] io::Error),
    #[error("text decoder for {0} stopped without a result")]
    Disconnected(String),
}

/// Text produced by a finished decode, tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub file_name: String,
    pub text: String,
}

/// Outcome of checking on a [`PendingDecode`].
#[derive(Debug)]
pub enum DecodePoll {
    Ready(Result<DecodedText, DecodeError>),
    Pending(PendingDecode),
}

/// Token for a text file being read and decoded on a worker thread.
///
/// Checking on the token consumes it and hands it back only while the decode
/// is still running, so the finished text can be observed exactly once.
/// Dropping the token, or calling [`PendingDecode::cancel`], discards the
/// result.
#[derive(Debug)]
pub struct PendingDecode {
    file_name: String,
    receiver: Receiver<Result<String, DecodeError>>,
    cancelled: Arc<AtomicBool>,
}

impl PendingDecode {
    /// Start reading `source` and decoding it as UTF-8. Invalid sequences are
    /// replaced rather than rejected.
    pub fn spawn(file_name: impl Into<String>, source: FileSource) -> Result<Self, DecodeError> {
        let file_name = file_name.into();
        let (sender, receiver) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);

        thread::Builder::new()
            .name("text-decode".to_string())
            .spawn(move || {
                let origin = source.describe();
                let result = source
                    .into_bytes()
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .map_err(|source| DecodeError::Read { origin, source });
                if !worker_cancelled.load(Ordering::Acquire) {
                    let _ = sender.send(result);
                }
            })
            .map_err(DecodeError::Spawn)?;

        debug!(file_name = %file_name, "started text decode");
        Ok(Self {
            file_name,
            receiver,
            cancelled,
        })
    }

    /// Name of the file being decoded.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Check without blocking.
    pub fn poll(self) -> DecodePoll {
        match self.receiver.try_recv() {
            Ok(result) => DecodePoll::Ready(self.finish(result)),
            Err(TryRecvError::Empty) => DecodePoll::Pending(self),
            Err(TryRecvError::Disconnected) => {
                DecodePoll::Ready(Err(DecodeError::Disconnected(self.file_name)))
            }
        }
    }

    /// Block until the decode finishes.
    pub fn wait(self) -> Result<DecodedText, DecodeError> {
        match self.receiver.recv() {
            Ok(result) => self.finish(result),
            Err(_) => Err(DecodeError::Disconnected(self.file_name)),
        }
    }

    /// Abandon the decode. The worker may still finish reading, but its result
    /// is dropped.
    pub fn cancel(self) {
        self.cancelled.store(true, Ordering::Release);
        debug!(file_name = %self.file_name, "cancelled text decode");
    }

    fn finish(self, result: Result<String, DecodeError>) -> Result<DecodedText, DecodeError> {
        let file_name = self.file_name;
        result.map(|text| DecodedText { file_name, text })
    }
}
