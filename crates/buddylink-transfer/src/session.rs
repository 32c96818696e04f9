//! Transfer session state
//!
//! ```text
//! Idle -> Offering -> Connecting -> Transferring -> Completed
//!   \________________________/            |
//!    (receiver skips Offering)            v
//!           any non-terminal state ---> Error
//! ```

use crate::error::{TransferError, TransferResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    Idle,
    /// Offer sent, waiting for the answer
    Offering,
    /// Answer exchanged, data channel opening
    Connecting,
    Transferring,
    Completed,
    Error,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use TransferState::{Completed, Connecting, Error, Idle, Offering, Transferring};

        match (self, next) {
            (Completed | Error, _) => false,
            (_, Error) => true,
            (Idle, Offering | Connecting) => true,
            (Offering, Connecting) => true,
            (Connecting, Transferring) => true,
            (Transferring, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Offering => "offering",
            Self::Connecting => "connecting",
            Self::Transferring => "transferring",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First frame on the data channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_name: String,
    pub file_size: u64,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

impl FileMetadata {
    pub fn new(file_name: impl Into<String>, file_size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
            mime_type: mime_type.into(),
        }
    }
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
    pub percentage: f64,
}

impl TransferProgress {
    pub fn new(bytes_transferred: u64, total_bytes: u64) -> Self {
        let percentage = if total_bytes == 0 {
            100.0
        } else {
            bytes_transferred as f64 / total_bytes as f64 * 100.0
        };
        Self {
            bytes_transferred,
            total_bytes,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_transferred >= self.total_bytes
    }
}

/// One side's view of a transfer. Never persisted.
#[derive(Debug, Clone)]
pub struct TransferSession {
    transfer_id: Uuid,
    chunk_size: usize,
    total_bytes: u64,
    bytes_transferred: u64,
    state: TransferState,
}

impl TransferSession {
    pub fn new(chunk_size: usize, total_bytes: u64) -> Self {
        Self {
            transfer_id: Uuid::new_v4(),
            chunk_size: chunk_size.max(1),
            total_bytes,
            bytes_transferred: 0,
            state: TransferState::Idle,
        }
    }

    /// The receiving side of an accepted offer. The size is learned from
    /// the metadata frame.
    pub fn incoming(chunk_size: usize) -> Self {
        Self {
            state: TransferState::Connecting,
            ..Self::new(chunk_size, 0)
        }
    }

    pub fn transfer_id(&self) -> Uuid {
        self.transfer_id
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Number of chunks the file splits into
    pub fn chunk_count(&self) -> u64 {
        self.total_bytes.div_ceil(self.chunk_size as u64)
    }

    pub fn progress(&self) -> TransferProgress {
        TransferProgress::new(self.bytes_transferred, self.total_bytes)
    }

    pub fn transition(&mut self, next: TransferState) -> TransferResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(TransferError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!(
            transfer_id = %self.transfer_id,
            from = %self.state,
            to = %next,
            "Transfer state change"
        );
        self.state = next;
        Ok(())
    }

    /// Move to `Error` unless already terminal
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = TransferState::Error;
        }
    }

    pub(crate) fn set_total_bytes(&mut self, total_bytes: u64) {
        self.total_bytes = total_bytes;
    }

    pub(crate) fn record(&mut self, bytes: usize) -> TransferProgress {
        self.bytes_transferred += bytes as u64;
        self.progress()
    }
}
