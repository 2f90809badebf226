// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Ask future
//!
//! One-shot reply slot used by [`ActorRef::ask`](crate::ActorRef::ask). The slot is addressable
//! like an actor: the asked actor simply replies to its sender.
//!

use crate::{ActorPath, ActorRef, Message};

use tokio::sync::{oneshot, Mutex};

use tracing::{debug, error};

use std::sync::Arc;

/// Path reported by the reference of a future.
pub(crate) const FUTURE_PATH: &str = "/future";

/// Writable side of a future, shared by every clone of its reference. The first write takes
/// the sender out, later writes find the slot empty.
pub(crate) type FutureSlot = Arc<Mutex<Option<oneshot::Sender<Message>>>>;

/// Pending result of an `ask`.
///
/// The first message sent to the future's reference becomes the result, anything sent after
/// that is discarded. The result can be taken once: [`AskFuture::get_result`] returns `None` on
/// every later call.
#[derive(Debug)]
pub struct AskFuture {
    receiver: Option<oneshot::Receiver<Message>>,
}

impl AskFuture {
    /// Creates a future and the reference that resolves it.
    pub(crate) fn new() -> (Self, ActorRef) {
        let (sender, receiver) = oneshot::channel();
        let slot: FutureSlot = Arc::new(Mutex::new(Some(sender)));
        let reference = ActorRef::future(ActorPath::from(FUTURE_PATH), slot);
        (
            Self {
                receiver: Some(receiver),
            },
            reference,
        )
    }

    /// Waits for the result.
    ///
    /// Returns `None` if the result was already taken, or if every copy of the future's
    /// reference was dropped without a reply. There is no timeout.
    pub async fn get_result(&mut self) -> Option<Message> {
        let receiver = self.receiver.take()?;
        receiver.await.ok()
    }

    /// Relays the result to `target` from a background task, declaring `sender` as its sender.
    /// Nothing is relayed if the future resolves without a result.
    pub fn forward_result(mut self, sender: Option<ActorRef>, target: ActorRef) {
        tokio::spawn(async move {
            let Some(result) = self.get_result().await else {
                debug!("Future resolved without result, nothing to forward.");
                return;
            };
            if let Err(err) = target.send(sender, result).await {
                error!("Failed to forward result to {}: {}", target.path(), err);
            }
        });
    }
}

/// Writes into a future slot. Only the first write is delivered.
pub(crate) async fn resolve(slot: &FutureSlot, message: Message) {
    let sender = slot.lock().await.take();
    if let Some(sender) = sender {
        // The receiver may be gone if nobody waits for the result anymore.
        let _ = sender.send(message);
    }
}
