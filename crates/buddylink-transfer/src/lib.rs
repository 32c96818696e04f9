//! # buddylink-transfer
//!
//! The client-side half of a peer-to-peer file transfer. Signaling goes
//! through the gateway; once the data channel is open the file moves
//! directly between the two peers:
//!
//! 1. one text frame with `{fileName, fileSize, mimeType}`
//! 2. the file bytes as fixed-size binary chunks, strictly in order
//!
//! There is no acknowledgement, resume or retry. Any transport failure
//! ends the transfer in [`TransferState::Error`].
//!
//! ```rust,ignore
//! let mut session = TransferSession::new(config.chunk_size, data.len() as u64);
//! session.transition(TransferState::Offering)?;
//! let answer = await_answer(answer_rx, config.answer_timeout).await?;
//! session.transition(TransferState::Connecting)?;
//! FileSender::new(&channel, &config)
//!     .send(&mut session, &metadata, &data, |p| println!("{:.1}%", p.percentage))
//!     .await?;
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod receiver;
pub mod sender;
pub mod session;
pub mod signaling;

pub use channel::{memory_channel, DataChannel, Frame, MemoryChannel};
pub use config::TransferConfig;
pub use error::{TransferError, TransferResult};
pub use receiver::{FileReceiver, ReceiveEvent, ReceivedFile};
pub use sender::{send_file, FileSender};
pub use session::{FileMetadata, TransferProgress, TransferSession, TransferState};
pub use signaling::{await_answer, cancel};
