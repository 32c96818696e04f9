//! Transfer tuning

use std::time::Duration;

/// Chunk size used by the browser client (16 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Largest file a receiver will buffer (100 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    pub chunk_size: usize,
    /// Cooperative delay between chunk sends
    pub pacing: Duration,
    /// How long the initiator waits for `webrtc:answer`
    pub answer_timeout: Duration,
    pub max_file_size: u64,
    /// Per-send limit; `None` waits on the channel indefinitely
    pub send_timeout: Option<Duration>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pacing: Duration::from_millis(1),
            answer_timeout: Duration::from_secs(30),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            send_timeout: None,
        }
    }
}

impl TransferConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero is bumped to one byte
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_answer_timeout(mut self, timeout: Duration) -> Self {
        self.answer_timeout = timeout;
        self
    }

    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }
}
