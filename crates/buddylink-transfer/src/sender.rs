//! Sending side: metadata frame, then ordered chunks

use crate::channel::DataChannel;
use crate::config::TransferConfig;
use crate::error::{TransferError, TransferResult};
use crate::session::{FileMetadata, TransferProgress, TransferSession, TransferState};
use bytes::Bytes;
use std::future::Future;

pub struct FileSender<'a, C: DataChannel + ?Sized> {
    channel: &'a C,
    config: &'a TransferConfig,
}

impl<'a, C: DataChannel + ?Sized> FileSender<'a, C> {
    pub fn new(channel: &'a C, config: &'a TransferConfig) -> Self {
        Self { channel, config }
    }

    /// Stream `data` to the peer
    ///
    /// `session` must be `Connecting`. Each chunk is sent only after the
    /// previous send returned. Returns the number of chunks sent; a
    /// zero-byte file sends the metadata frame only. On failure the
    /// session is left in `Error`.
    pub async fn send<F>(
        &self,
        session: &mut TransferSession,
        metadata: &FileMetadata,
        data: &[u8],
        mut on_progress: F,
    ) -> TransferResult<usize>
    where
        F: FnMut(TransferProgress),
    {
        if metadata.file_size != data.len() as u64 {
            session.fail();
            return Err(TransferError::SizeMismatch {
                declared: metadata.file_size,
                actual: data.len() as u64,
            });
        }

        session.transition(TransferState::Transferring)?;

        match self.stream(session, metadata, data, &mut on_progress).await {
            Ok(chunks) => {
                session.transition(TransferState::Completed)?;
                tracing::info!(
                    transfer_id = %session.transfer_id(),
                    bytes = data.len(),
                    chunks,
                    "File sent"
                );
                Ok(chunks)
            }
            Err(e) => {
                session.fail();
                tracing::warn!(
                    transfer_id = %session.transfer_id(),
                    sent = session.bytes_transferred(),
                    error = %e,
                    "File send failed"
                );
                Err(e)
            }
        }
    }

    async fn stream<F>(
        &self,
        session: &mut TransferSession,
        metadata: &FileMetadata,
        data: &[u8],
        on_progress: &mut F,
    ) -> TransferResult<usize>
    where
        F: FnMut(TransferProgress),
    {
        let header = serde_json::to_string(metadata)?;
        self.guarded(self.channel.send_text(header)).await?;

        let chunk_size = session.chunk_size();
        let total = data.len().div_ceil(chunk_size);

        for (index, chunk) in data.chunks(chunk_size).enumerate() {
            self.guarded(self.channel.send_binary(Bytes::copy_from_slice(chunk)))
                .await?;
            on_progress(session.record(chunk.len()));

            if index + 1 < total && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        Ok(total)
    }

    async fn guarded(&self, send: impl Future<Output = TransferResult<()>>) -> TransferResult<()> {
        match self.config.send_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| TransferError::Stalled(limit))?,
            None => send.await,
        }
    }
}

/// Convenience for callers that only know the file and the channel
pub async fn send_file<C: DataChannel + ?Sized>(
    channel: &C,
    config: &TransferConfig,
    metadata: &FileMetadata,
    data: &[u8],
) -> TransferResult<TransferSession> {
    let mut session = TransferSession::new(config.chunk_size, data.len() as u64);
    session.transition(TransferState::Connecting)?;
    FileSender::new(channel, config)
        .send(&mut session, metadata, data, |_| {})
        .await?;
    Ok(session)
}
