//! Data channel seam
//!
//! The transfer logic only needs to push ordered text and binary frames
//! and to close the channel. A WebRTC data channel, a WebSocket or the
//! in-process [`MemoryChannel`] can sit behind [`DataChannel`].

use crate::error::{TransferError, TransferResult};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// One message on the data channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }
}

/// An open, ordered, reliable channel to the peer
#[async_trait]
pub trait DataChannel: Send + Sync {
    async fn send_text(&self, text: String) -> TransferResult<()>;

    async fn send_binary(&self, data: Bytes) -> TransferResult<()>;

    async fn close(&self);
}

/// In-process channel backed by a bounded mpsc queue
///
/// A full queue makes `send_*` wait, which is how a slow peer shows up
/// to the sender. Closing drops the queue's sender, so the peer reads the
/// frames already queued and then sees the end of the channel.
pub struct MemoryChannel {
    sender: Mutex<Option<mpsc::Sender<Frame>>>,
}

/// Create a channel and the receiving end the peer reads frames from
pub fn memory_channel(buffer: usize) -> (MemoryChannel, mpsc::Receiver<Frame>) {
    let (sender, receiver) = mpsc::channel(buffer.max(1));
    (
        MemoryChannel {
            sender: Mutex::new(Some(sender)),
        },
        receiver,
    )
}

impl MemoryChannel {
    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .as_ref()
            .map_or(true, mpsc::Sender::is_closed)
    }

    async fn push(&self, frame: Frame) -> TransferResult<()> {
        // Clone out so the lock is never held across the send
        let sender = self
            .sender
            .lock()
            .clone()
            .ok_or(TransferError::ChannelClosed)?;

        sender
            .send(frame)
            .await
            .map_err(|_| TransferError::ChannelClosed)
    }
}

#[async_trait]
impl DataChannel for MemoryChannel {
    async fn send_text(&self, text: String) -> TransferResult<()> {
        self.push(Frame::Text(text)).await
    }

    async fn send_binary(&self, data: Bytes) -> TransferResult<()> {
        self.push(Frame::Binary(data)).await
    }

    async fn close(&self) {
        self.sender.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let (channel, mut rx) = memory_channel(4);
        channel.send_text("meta".to_string()).await.unwrap();
        channel.send_binary(Bytes::from_static(b"abc")).await.unwrap();

        assert_eq!(rx.recv().await, Some(Frame::Text("meta".to_string())));
        assert_eq!(rx.recv().await, Some(Frame::Binary(Bytes::from_static(b"abc"))));
    }

    #[tokio::test]
    async fn test_closed_channel_rejects_sends() {
        let (channel, _rx) = memory_channel(4);
        channel.close().await;
        assert!(channel.is_closed());
        assert!(matches!(
            channel.send_text("x".to_string()).await,
            Err(TransferError::ChannelClosed)
        ));

        let (channel, rx) = memory_channel(4);
        drop(rx);
        assert!(channel.is_closed());
        assert!(matches!(
            channel.send_binary(Bytes::new()).await,
            Err(TransferError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_close_ends_the_peer_stream_after_queued_frames() {
        let (channel, mut rx) = memory_channel(4);
        channel.send_text("meta".to_string()).await.unwrap();
        channel.close().await;

        assert_eq!(rx.recv().await, Some(Frame::Text("meta".to_string())));
        assert_eq!(rx.recv().await, None);
    }
}
