//! Initiator-side signaling helpers

use crate::channel::DataChannel;
use crate::error::{TransferError, TransferResult};
use crate::session::TransferSession;
use std::time::Duration;
use tokio::sync::oneshot;

/// Wait for the peer's answer, giving up after `timeout`
///
/// The gateway keeps no transfer state, so an unanswered offer is only
/// ever abandoned here.
pub async fn await_answer<T>(answer: oneshot::Receiver<T>, timeout: Duration) -> TransferResult<T> {
    match tokio::time::timeout(timeout, answer).await {
        Ok(Ok(answer)) => Ok(answer),
        Ok(Err(_)) => Err(TransferError::AnswerDropped),
        Err(_) => {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Offer went unanswered");
            Err(TransferError::SignalingTimeout(timeout))
        }
    }
}

/// Abort a transfer: close the channel and move the session to `Error`
///
/// A live session ends as `Err(Cancelled)`; terminal sessions are left alone.
pub async fn cancel<C: DataChannel + ?Sized>(
    channel: &C,
    session: &mut TransferSession,
) -> TransferResult<()> {
    if session.state().is_terminal() {
        return Ok(());
    }

    channel.close().await;
    session.fail();
    tracing::info!(
        transfer_id = %session.transfer_id(),
        sent = session.bytes_transferred(),
        "Transfer cancelled"
    );
    Err(TransferError::Cancelled)
}
