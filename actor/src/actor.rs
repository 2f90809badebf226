// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor
//!
//! The `actor` module provides the `Actor` trait, the `ActorContext` handed to behaviors and
//! the `ActorRef` type used to address actors. An `ActorRef` is the only way to reach an actor:
//! it enqueues messages into the actor's mailbox and never exposes its state.
//!

use crate::{
    ActorPath, Error,
    control::ControlHandle,
    future::{self, AskFuture, FutureSlot},
    mailbox::{ActorMessage, MailboxSender, Message},
};

use async_trait::async_trait;

use tokio::sync::oneshot;

use tracing::debug;

use std::{collections::HashMap, fmt, sync::Arc};

/// Behavior of an actor.
///
/// A behavior instance is owned by exactly one actor and only ever called from that actor's
/// task, one hook at a time, so it can keep plain mutable state. Every hook has a default
/// implementation; a behavior overrides the ones it needs.
///
/// Returning an error from a hook is treated as a fault of the actor: a failing `on_start`
/// aborts the creation, a failing `receive` makes the actor stop itself. There is no restart.
///
/// # Examples
///
/// ```ignore
/// use actor::{Actor, ActorContext, Error, Message};
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Actor for Echo {
///     async fn receive(&mut self, ctx: &mut ActorContext, message: Message) -> Result<(), Error> {
///         if let Some(sender) = ctx.sender() {
///             sender.send(ctx.reference(), message).await?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Send + 'static {
    /// Called once before the first message is dequeued. The creator of the actor gets its
    /// reference only after this hook returns.
    async fn on_start(&mut self, _ctx: &mut ActorContext) -> Result<(), Error> {
        Ok(())
    }

    /// Called once after every child has stopped. The actor has no self reference anymore.
    async fn on_stop(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Handles one message. `ctx.sender()` is the declared sender of this message.
    async fn receive(
        &mut self,
        ctx: &mut ActorContext,
        _message: Message,
    ) -> Result<(), Error> {
        debug!("Actor {} ignored a message.", ctx.path());
        Ok(())
    }
}

/// Behavior that does nothing. Used for the root actor of every system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultActor;

#[async_trait]
impl Actor for DefaultActor {}

/// Reusable source of behaviors, an alternative to passing a closure to
/// [`ActorContext::create_child`].
pub trait ActorFactory: Send + Sync + 'static {
    /// Behavior built by this factory.
    type Actor: Actor;

    /// Builds a fresh behavior instance.
    fn new_actor(&self) -> Self::Actor;
}

/// Type-erased behavior constructor carried by a create request. It runs on the control plane.
pub(crate) type ActorBuilder = Box<dyn FnOnce() -> Box<dyn Actor> + Send>;

/// Lifecycle of an actor.
///
/// `Starting → Running → Stopping → Stopped`. An actor loses its self reference when it enters
/// `Stopping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorLifecycle {
    /// `on_start` is running.
    Starting,
    /// Messages are being dequeued.
    Running,
    /// A poison pill was received: children are being stopped, then `on_stop` runs.
    Stopping,
    /// Deregistered. Terminal.
    Stopped,
}

/// Per-actor facade handed to every behavior hook.
///
/// It exposes the addresses around the actor (itself, the sender of the current message, its
/// parent and its children) and bridges to the control plane for creating, finding and
/// stopping actors. The context is owned by the actor's task; only that task records children.
pub struct ActorContext {
    /// Path of the actor.
    path: ActorPath,
    /// Current lifecycle state.
    lifecycle: ActorLifecycle,
    /// Public reference of the actor (the proxy's, for proxy actors).
    reference: ActorRef,
    /// Declared sender of the message being dispatched.
    sender: Option<ActorRef>,
    /// Parent reference. `None` for a system root.
    parent: Option<ActorRef>,
    /// Children created through this context, by local name.
    children: HashMap<String, ActorRef>,
    /// Request queue of the control plane.
    control: ControlHandle,
}

impl ActorContext {
    pub(crate) fn new(
        path: ActorPath,
        reference: ActorRef,
        parent: Option<ActorRef>,
        control: ControlHandle,
    ) -> Self {
        Self {
            path,
            lifecycle: ActorLifecycle::Starting,
            reference,
            sender: None,
            parent,
            children: HashMap::new(),
            control,
        }
    }

    /// Path of the actor.
    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> ActorLifecycle {
        self.lifecycle
    }

    /// The actor's own reference, `None` once the actor is stopping.
    pub fn reference(&self) -> Option<ActorRef> {
        match self.lifecycle {
            ActorLifecycle::Starting | ActorLifecycle::Running => {
                Some(self.reference.clone())
            }
            ActorLifecycle::Stopping | ActorLifecycle::Stopped => None,
        }
    }

    /// Declared sender of the message being handled. Only set inside `receive`.
    pub fn sender(&self) -> Option<ActorRef> {
        self.sender.clone()
    }

    /// Reference of the parent actor, `None` for a system root.
    pub fn parent(&self) -> Option<ActorRef> {
        self.parent.clone()
    }

    /// A child created through this context, by local name.
    pub fn get_child(&self, name: &str) -> Option<ActorRef> {
        self.children.get(name).cloned()
    }

    /// Creates a child actor named `name` whose behavior is built by `factory`.
    ///
    /// Waits until the child has run its `on_start`. Returns `Ok(None)` if an actor with the
    /// resulting path already exists.
    ///
    /// # Errors
    ///
    /// `Error::Start` if the child's `on_start` failed, `Error::InvalidName` if `name` is empty
    /// or contains `/`, `Error::Stopping` if this actor is stopping, `Error::System` if the
    /// system is shut down.
    pub async fn create_child<A, F>(
        &mut self,
        name: &str,
        factory: F,
    ) -> Result<Option<ActorRef>, Error>
    where
        A: Actor,
        F: FnOnce() -> A + Send + 'static,
    {
        self.create(name, Box::new(move || Box::new(factory()) as Box<dyn Actor>), false)
            .await
    }

    /// Like [`ActorContext::create_child`], but the child is fronted by a proxy: its reference
    /// writes into an unbounded buffer and never waits on the child's mailbox.
    pub async fn create_proxy_child<A, F>(
        &mut self,
        name: &str,
        factory: F,
    ) -> Result<Option<ActorRef>, Error>
    where
        A: Actor,
        F: FnOnce() -> A + Send + 'static,
    {
        self.create(name, Box::new(move || Box::new(factory()) as Box<dyn Actor>), true)
            .await
    }

    /// Creates a child actor from a shared [`ActorFactory`].
    pub async fn create_child_from_factory<F>(
        &mut self,
        name: &str,
        factory: Arc<F>,
    ) -> Result<Option<ActorRef>, Error>
    where
        F: ActorFactory,
    {
        self.create_child(name, move || factory.new_actor()).await
    }

    async fn create(
        &mut self,
        name: &str,
        builder: ActorBuilder,
        proxy: bool,
    ) -> Result<Option<ActorRef>, Error> {
        if matches!(
            self.lifecycle,
            ActorLifecycle::Stopping | ActorLifecycle::Stopped
        ) {
            return Err(Error::Stopping(self.path.clone()));
        }
        let child = self
            .control
            .create(name, Some(self.reference.clone()), builder, proxy)
            .await?;
        if let Some(child) = &child {
            self.children.insert(name.to_owned(), child.clone());
        }
        Ok(child)
    }

    /// Looks an actor up by path. `Ok(None)` if no such actor is registered.
    pub async fn find_actor(
        &self,
        path: impl Into<ActorPath>,
    ) -> Result<Option<ActorRef>, Error> {
        self.control.lookup(path.into()).await
    }

    /// Sends a poison pill to `target` without waiting for it to stop.
    pub async fn stop(&self, target: &ActorRef) -> Result<(), Error> {
        debug!("Actor {} stops {}.", self.path, target.path());
        target.send_poison_pill(self.reference(), None).await
    }

    pub(crate) fn control(&self) -> &ControlHandle {
        &self.control
    }

    /// Reference of the actor regardless of its lifecycle.
    pub(crate) fn own_reference(&self) -> ActorRef {
        self.reference.clone()
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: ActorLifecycle) {
        debug!("Actor {} is {:?}.", self.path, lifecycle);
        self.lifecycle = lifecycle;
    }

    pub(crate) fn set_sender(&mut self, sender: Option<ActorRef>) {
        self.sender = sender;
    }
}

/// Where an [`ActorRef`] writes.
#[derive(Clone)]
enum Target {
    /// An actor mailbox, or the inbound queue of a proxy.
    Mailbox(MailboxSender),
    /// The slot of an [`AskFuture`].
    Future(FutureSlot),
}

/// Address of an actor.
///
/// A reference is cheap to clone and can be shared with any actor or task. It carries no
/// ownership of the actor: once the actor has stopped, sends through the reference fail with
/// `Error::Send`.
#[derive(Clone)]
pub struct ActorRef {
    path: ActorPath,
    target: Target,
}

impl ActorRef {
    pub(crate) fn new(path: ActorPath, sender: MailboxSender) -> Self {
        Self {
            path,
            target: Target::Mailbox(sender),
        }
    }

    pub(crate) fn future(path: ActorPath, slot: FutureSlot) -> Self {
        Self {
            path,
            target: Target::Future(slot),
        }
    }

    /// Path of the target actor.
    pub fn path(&self) -> ActorPath {
        self.path.clone()
    }

    /// True if the target can no longer receive messages.
    pub fn is_closed(&self) -> bool {
        match &self.target {
            Target::Mailbox(sender) => sender.is_closed(),
            Target::Future(slot) => slot
                .try_lock()
                .map(|sender| sender.is_none())
                .unwrap_or(false),
        }
    }

    /// Enqueues `message` with `sender` as its declared sender.
    ///
    /// Waits while the target mailbox is full. A reference to a future delivers the first
    /// message only and silently ignores the rest.
    ///
    /// # Errors
    ///
    /// `Error::Send` if the target has stopped.
    pub async fn send<M>(&self, sender: Option<ActorRef>, message: M) -> Result<(), Error>
    where
        M: std::any::Any + Send,
    {
        let message = Message::new(message);
        match &self.target {
            Target::Mailbox(mailbox) => {
                mailbox
                    .send(ActorMessage::user(sender, message))
                    .await
                    .map_err(|_| {
                        debug!("Mailbox of {} is closed.", self.path);
                        Error::Send(self.path.to_string())
                    })
            }
            Target::Future(slot) => {
                future::resolve(slot, message).await;
                Ok(())
            }
        }
    }

    /// Sends `message` with a fresh [`AskFuture`] as its sender and returns the future without
    /// waiting for the reply.
    ///
    /// # Panics
    ///
    /// Asking a future is a protocol misuse and panics.
    pub async fn ask<M>(&self, message: M) -> Result<AskFuture, Error>
    where
        M: std::any::Any + Send,
    {
        if let Target::Future(_) = self.target {
            panic!("Can not ask a future");
        }
        let (future, reference) = AskFuture::new();
        self.send(Some(reference), message).await?;
        Ok(future)
    }

    /// Sends a poison pill and waits until the target and all its descendants have stopped.
    pub async fn ask_stop(&self) -> Result<(), Error> {
        let (ack, stopped) = oneshot::channel();
        self.send_poison_pill(None, Some(ack)).await?;
        stopped
            .await
            .map_err(|error| Error::Send(error.to_string()))
    }

    pub(crate) async fn send_poison_pill(
        &self,
        sender: Option<ActorRef>,
        ack: Option<oneshot::Sender<()>>,
    ) -> Result<(), Error> {
        match &self.target {
            Target::Mailbox(mailbox) => mailbox
                .send(ActorMessage::poison_pill(sender, ack))
                .await
                .map_err(|_| Error::Send(self.path.to_string())),
            // A future has nothing to stop.
            Target::Future(_) => Ok(()),
        }
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && match (&self.target, &other.target) {
                (Target::Mailbox(a), Target::Mailbox(b)) => a.same_channel(b),
                (Target::Future(a), Target::Future(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActorRef").field(&self.path).finish()
    }
}
