// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Mailbox
//!
//! Payload and envelope types carried by actor mailboxes, and the bounded channel that backs
//! each mailbox.
//!

use crate::ActorRef;

use tokio::sync::{mpsc, oneshot};

use std::any::Any;
use std::fmt;

/// Opaque user payload.
///
/// Actors exchange values of any `Send + 'static` type. The receiving behavior resolves the
/// concrete type itself, usually with [`Message::downcast_ref`] or [`Message::downcast`].
///
/// ```ignore
/// async fn receive(&mut self, ctx: &mut ActorContext, message: Message) -> Result<(), Error> {
///     if let Some(text) = message.downcast_ref::<String>() {
///         println!("got {text}");
///     }
///     Ok(())
/// }
/// ```
pub struct Message(Box<dyn Any + Send>);

impl Message {
    /// Wraps a value. Wrapping a `Message` returns it unchanged instead of nesting it.
    pub fn new<M>(message: M) -> Self
    where
        M: Any + Send,
    {
        let boxed: Box<dyn Any + Send> = Box::new(message);
        match boxed.downcast::<Message>() {
            Ok(message) => *message,
            Err(boxed) => Message(boxed),
        }
    }

    /// True if the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Borrows the payload as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Takes the payload out as a `T`, or gives the message back if it holds another type.
    pub fn downcast<T: Any>(self) -> Result<T, Message> {
        self.0.downcast::<T>().map(|value| *value).map_err(Message)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").finish_non_exhaustive()
    }
}

/// Acknowledgment channel of a poison pill, signalled once the target has fully stopped.
pub(crate) type StopAck = oneshot::Sender<()>;

/// Body of a mailbox envelope.
pub(crate) enum MessageBody {
    /// Request to stop, cascading to the children first.
    PoisonPill(Option<StopAck>),
    /// Anything else, handed to the behavior.
    User(Message),
}

/// Mailbox envelope.
pub(crate) struct ActorMessage {
    /// Declared sender, exposed to the behavior while the envelope is dispatched.
    pub(crate) sender: Option<ActorRef>,
    pub(crate) body: MessageBody,
}

impl ActorMessage {
    pub(crate) fn user(sender: Option<ActorRef>, message: Message) -> Self {
        Self {
            sender,
            body: MessageBody::User(message),
        }
    }

    pub(crate) fn poison_pill(sender: Option<ActorRef>, ack: Option<StopAck>) -> Self {
        Self {
            sender,
            body: MessageBody::PoisonPill(ack),
        }
    }
}

/// Mailbox sender side. Any number of references may hold one.
pub(crate) type MailboxSender = mpsc::Sender<ActorMessage>;

/// Mailbox receiver side, owned by exactly one runner (or proxy).
pub(crate) type MailboxReceiver = mpsc::Receiver<ActorMessage>;

/// Creates a bounded mailbox. Senders wait while it holds `capacity` envelopes.
pub(crate) fn mailbox(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    mpsc::channel(capacity)
}
