use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

/// Event name used by [`EmitterNotices`].
pub const NOTICE_EVENT: &str = "notice";

/// Something the user has to be told after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    PaymentUpdated,
    /// The service answered `success: false`; `message` is shown verbatim.
    PaymentRejected { message: String },
    /// The request failed or the reply could not be read.
    TransportFailed { reason: String },
    /// The form input was not usable; nothing was sent.
    InvalidInput { reason: String },
}

impl Notice {
    pub fn is_success(&self) -> bool {
        matches!(self, Notice::PaymentUpdated)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PaymentUpdated => write!(f, "Payment updated successfully!"),
            Notice::PaymentRejected { message } => {
                write!(f, "Failed to update payment: {}", message)
            }
            Notice::TransportFailed { reason } => {
                write!(f, "Loan service request failed: {}", reason)
            }
            Notice::InvalidInput { reason } => write!(f, "Invalid payment: {}", reason),
        }
    }
}

/// Where notices go.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Prints notices to stdout, or collects their text in a buffer.
pub struct LogNotices {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for LogNotices {
    fn default() -> Self {
        Self::new()
    }
}

impl LogNotices {
    pub fn new() -> Self {
        LogNotices { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogNotices {
            buffer: Some(buffer),
        }
    }
}

impl NoticeSink for LogNotices {
    fn notify(&self, notice: &Notice) {
        let line = notice.to_string();
        info!(success = notice.is_success(), "{}", line);
        if let Some(buffer) = &self.buffer {
            buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(line);
        } else {
            println!("{}", line);
        }
    }
}

/// Publishes notices as [`NOTICE_EVENT`] on an `EventEmitter` for in-process
/// listeners. Listeners run on the emitter's own threads.
#[cfg(feature = "emitter")]
pub struct EmitterNotices {
    emitter: Mutex<EventEmitter>,
}

#[cfg(feature = "emitter")]
impl EmitterNotices {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterNotices {
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener for every notice.
    pub fn on<F>(&self, listener: F)
    where
        F: Fn(Notice) + Send + Sync + 'static,
    {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on(NOTICE_EVENT, listener);
    }
}

#[cfg(feature = "emitter")]
impl NoticeSink for EmitterNotices {
    fn notify(&self, notice: &Notice) {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(NOTICE_EVENT, notice.clone());
    }
}
