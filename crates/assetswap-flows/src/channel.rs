//! Point-to-point messaging between two parties.
//!
//! [`MessageChannel`] is the only transport the flows see. [`LocalSession`]
//! implements it in-process over tokio channels, JSON-encoding every message
//! so the wire shape is exercised even without a network.

use std::time::Duration;

use assetswap_types::{Party, Result, SwapError};
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::SwapMessage;

/// Reliable, ordered channel to one counterparty.
#[async_trait]
pub trait MessageChannel: Send {
    /// Who is on the other end.
    fn counterparty(&self) -> &Party;

    /// # Errors
    /// [`SwapError::ChannelClosed`] if the other end is gone.
    async fn send(&mut self, message: SwapMessage) -> Result<()>;

    /// Wait for the next message.
    ///
    /// # Errors
    /// [`SwapError::Timeout`], [`SwapError::ChannelClosed`], or
    /// [`SwapError::Protocol`] for an undecodable message.
    async fn receive(&mut self) -> Result<SwapMessage>;
}

/// In-process session end.
#[derive(Debug)]
pub struct LocalSession {
    counterparty: Party,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    inbound: mpsc::UnboundedReceiver<Vec<u8>>,
    timeout: Duration,
}

impl LocalSession {
    /// Connected ends for `a` and `b`. The first is `a`'s end (its
    /// counterparty is `b`).
    #[must_use]
    pub fn pair(a: &Party, b: &Party, timeout: Duration) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self {
                counterparty: b.clone(),
                outbound: a_tx,
                inbound: a_rx,
                timeout,
            },
            Self {
                counterparty: a.clone(),
                outbound: b_tx,
                inbound: b_rx,
                timeout,
            },
        )
    }
}

#[async_trait]
impl MessageChannel for LocalSession {
    fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    async fn send(&mut self, message: SwapMessage) -> Result<()> {
        let bytes = serde_json::to_vec(&message)?;
        self.outbound
            .send(bytes)
            .map_err(|_| SwapError::ChannelClosed)?;
        tracing::trace!(to = %self.counterparty, kind = message.kind(), "Sent");
        Ok(())
    }

    async fn receive(&mut self) -> Result<SwapMessage> {
        let bytes = match tokio::time::timeout(self.timeout, self.inbound.recv()).await {
            Err(_) => {
                return Err(SwapError::Timeout {
                    waited_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            Ok(None) => return Err(SwapError::ChannelClosed),
            Ok(Some(bytes)) => bytes,
        };
        let message: SwapMessage =
            serde_json::from_slice(&bytes).map_err(|e| SwapError::Protocol {
                reason: format!("undecodable message from {}: {e}", self.counterparty),
            })?;
        tracing::trace!(from = %self.counterparty, kind = message.kind(), "Received");
        Ok(message)
    }
}

/// Send and ignore failure. Used once the outcome no longer depends on
/// delivery.
pub(crate) async fn send_best_effort<C>(channel: &mut C, message: SwapMessage)
where
    C: MessageChannel + ?Sized,
{
    let kind = message.kind();
    if let Err(err) = channel.send(message).await {
        tracing::debug!(
            to = %channel.counterparty(),
            kind,
            error = %err,
            "Best-effort send failed"
        );
    }
}
