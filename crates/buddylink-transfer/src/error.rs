//! Transfer errors

use crate::session::TransferState;
use std::time::Duration;
use thiserror::Error;

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid transfer transition: {from} -> {to}")]
    InvalidTransition {
        from: TransferState,
        to: TransferState,
    },

    #[error("no answer within {0:?}")]
    SignalingTimeout(Duration),

    #[error("signaling channel dropped before an answer arrived")]
    AnswerDropped,

    #[error("data channel is closed")]
    ChannelClosed,

    #[error("send did not complete within {0:?}")]
    Stalled(Duration),

    #[error("unexpected {0} frame")]
    UnexpectedFrame(&'static str),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(#[from] serde_json::Error),

    #[error("file of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("declared {declared} bytes but was given {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("received {received} bytes for a {expected} byte file")]
    Overrun { expected: u64, received: u64 },

    #[error("transfer cancelled")]
    Cancelled,

    #[error("failed to save file: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// Whether the data channel itself failed, as opposed to the peers
    /// disagreeing about the file
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ChannelClosed | Self::Stalled(_))
    }
}
