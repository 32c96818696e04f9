//! Receiving side: metadata, ordered chunks, reassembly

use crate::channel::Frame;
use crate::config::TransferConfig;
use crate::error::{TransferError, TransferResult};
use crate::session::{FileMetadata, TransferProgress, TransferSession, TransferState};
use bytes::{Bytes, BytesMut};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// What a single frame did to the transfer
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveEvent {
    Started(FileMetadata),
    Progress(TransferProgress),
    Completed(TransferProgress, ReceivedFile),
}

/// A fully reassembled file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub metadata: FileMetadata,
    pub data: Bytes,
}

impl ReceivedFile {
    /// Write the file under `dir`, returning its path
    ///
    /// Only the final path component of the sender's name is used.
    pub async fn save_into(&self, dir: impl AsRef<Path>) -> TransferResult<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(sanitize_file_name(&self.metadata.file_name));
        tokio::fs::write(&path, &self.data).await?;

        tracing::info!(path = %path.display(), bytes = self.data.len(), "File saved");
        Ok(path)
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');

    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Feeds data channel frames into a transfer session
pub struct FileReceiver {
    session: TransferSession,
    max_file_size: u64,
    metadata: Option<FileMetadata>,
    buffer: BytesMut,
}

impl FileReceiver {
    /// A receiver for an accepted offer; the data channel is being set up
    pub fn new(config: &TransferConfig) -> Self {
        Self {
            session: TransferSession::incoming(config.chunk_size),
            max_file_size: config.max_file_size,
            metadata: None,
            buffer: BytesMut::new(),
        }
    }

    pub fn session(&self) -> &TransferSession {
        &self.session
    }

    pub fn metadata(&self) -> Option<&FileMetadata> {
        self.metadata.as_ref()
    }

    /// Apply one frame. Any error leaves the session in `Error`.
    pub fn on_frame(&mut self, frame: Frame) -> TransferResult<ReceiveEvent> {
        let result = match frame {
            Frame::Text(text) => self.on_metadata(&text),
            Frame::Binary(chunk) => self.on_chunk(&chunk),
        };

        if let Err(e) = &result {
            self.session.fail();
            tracing::warn!(
                transfer_id = %self.session.transfer_id(),
                received = self.session.bytes_transferred(),
                error = %e,
                "File receive failed"
            );
        }
        result
    }

    /// Read frames until the file is complete
    ///
    /// The channel ending early is a transport error and leaves the
    /// session in `Error`.
    pub async fn run<F>(
        &mut self,
        frames: &mut mpsc::Receiver<Frame>,
        mut on_progress: F,
    ) -> TransferResult<ReceivedFile>
    where
        F: FnMut(TransferProgress),
    {
        while let Some(frame) = frames.recv().await {
            match self.on_frame(frame)? {
                ReceiveEvent::Started(_) => {}
                ReceiveEvent::Progress(progress) => on_progress(progress),
                ReceiveEvent::Completed(progress, file) => {
                    on_progress(progress);
                    return Ok(file);
                }
            }
        }

        self.session.fail();
        Err(TransferError::ChannelClosed)
    }

    pub fn cancel(&mut self) {
        self.session.fail();
    }

    fn on_metadata(&mut self, text: &str) -> TransferResult<ReceiveEvent> {
        if self.metadata.is_some() {
            return Err(TransferError::UnexpectedFrame("text"));
        }

        let metadata: FileMetadata = serde_json::from_str(text)?;
        if metadata.file_size > self.max_file_size {
            return Err(TransferError::TooLarge {
                size: metadata.file_size,
                max: self.max_file_size,
            });
        }

        self.session.transition(TransferState::Transferring)?;
        self.session.set_total_bytes(metadata.file_size);
        self.buffer.reserve(metadata.file_size as usize);
        self.metadata = Some(metadata.clone());

        tracing::debug!(
            transfer_id = %self.session.transfer_id(),
            file_name = %metadata.file_name,
            file_size = metadata.file_size,
            "Receiving file"
        );

        if metadata.file_size == 0 {
            return self.complete();
        }
        Ok(ReceiveEvent::Started(metadata))
    }

    fn on_chunk(&mut self, chunk: &[u8]) -> TransferResult<ReceiveEvent> {
        if self.metadata.is_none() || self.session.state() != TransferState::Transferring {
            return Err(TransferError::UnexpectedFrame("binary"));
        }

        let expected = self.session.total_bytes();
        let received = self.session.bytes_transferred() + chunk.len() as u64;
        if received > expected {
            return Err(TransferError::Overrun { expected, received });
        }

        self.buffer.extend_from_slice(chunk);
        let progress = self.session.record(chunk.len());

        if progress.is_complete() {
            return self.complete();
        }
        Ok(ReceiveEvent::Progress(progress))
    }

    fn complete(&mut self) -> TransferResult<ReceiveEvent> {
        self.session.transition(TransferState::Completed)?;

        let metadata = self
            .metadata
            .clone()
            .ok_or(TransferError::UnexpectedFrame("binary"))?;
        let data = std::mem::take(&mut self.buffer).freeze();

        tracing::info!(
            transfer_id = %self.session.transfer_id(),
            bytes = data.len(),
            "File received"
        );
        Ok(ReceiveEvent::Completed(
            self.session.progress(),
            ReceivedFile { metadata, data },
        ))
    }
}
