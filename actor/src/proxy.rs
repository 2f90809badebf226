// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Proxy
//!
//! A proxy fronts the mailbox of an actor with an unbounded buffer, so the public reference of
//! the actor never waits on the actor's own backpressure. It runs as its own task next to the
//! actor's runner and is stopped right after the actor has stopped.
//!

use crate::{
    ActorPath,
    mailbox::{ActorMessage, MailboxReceiver, MailboxSender},
};

use tokio::select;
use tokio_util::sync::CancellationToken;

use tracing::debug;

use std::collections::VecDeque;

/// Forwarding loop of a proxy.
pub(crate) struct ProxyRunner {
    path: ActorPath,
    /// Mailbox of the proxied actor.
    mailbox: MailboxSender,
    /// Queue written by the public reference.
    inbound: MailboxReceiver,
    /// Accepted envelopes not yet in the mailbox, oldest first.
    buffer: VecDeque<ActorMessage>,
    stop: CancellationToken,
}

impl ProxyRunner {
    pub(crate) fn new(
        path: ActorPath,
        mailbox: MailboxSender,
        inbound: MailboxReceiver,
        buffer_capacity: usize,
        stop: CancellationToken,
    ) -> Self {
        Self {
            path,
            mailbox,
            inbound,
            buffer: VecDeque::with_capacity(buffer_capacity),
            stop,
        }
    }

    /// Moves envelopes from the inbound queue to the mailbox in arrival order.
    ///
    /// While envelopes are buffered, accepting a new one races against pushing the oldest one
    /// into the mailbox. Ends on the stop signal, when the mailbox closes, or when the inbound
    /// queue is closed and the buffer is empty.
    pub(crate) async fn run(self) {
        let ProxyRunner {
            path,
            mailbox,
            mut inbound,
            mut buffer,
            stop,
        } = self;
        debug!("Running proxy of {}.", path);

        let mut inbound_open = true;
        while inbound_open || !buffer.is_empty() {
            select! {
                _ = stop.cancelled() => break,
                envelope = inbound.recv(), if inbound_open => {
                    match envelope {
                        Some(envelope) => buffer.push_back(envelope),
                        None => inbound_open = false,
                    }
                }
                permit = mailbox.reserve(), if !buffer.is_empty() => {
                    let Ok(permit) = permit else {
                        debug!("Mailbox of {} is closed.", path);
                        break;
                    };
                    if let Some(envelope) = buffer.pop_front() {
                        permit.send(envelope);
                    }
                }
            }
        }

        debug!(
            "Proxy of {} stopped, {} buffered messages dropped.",
            path,
            buffer.len()
        );
    }
}
