// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor runner
//!
//! Each actor executes inside its own `ActorRunner`, a tokio task that owns the behavior, the
//! receiving side of the mailbox and the actor context.
//!
//! The runner walks the lifecycle `Starting → Running → Stopping → Stopped`:
//!
//! - **Starting**: `on_start` runs once. The creator gets the actor reference only afterwards.
//! - **Running**: envelopes are dequeued one at a time in arrival order. The declared sender is
//!   exposed through the context while the envelope is dispatched.
//! - **Stopping**: on a poison pill the children are stopped one after the other, sorted by
//!   name, each one fully stopped before the next is asked. Then `on_stop` runs, the actor is
//!   deregistered, whoever sent the pill is acknowledged and the proxy, if any, is stopped.
//! - **Stopped**: envelopes left in the mailbox are dropped and the mailbox is closed, so
//!   stale references get `Error::Send`.
//!

use crate::{
    ActorPath, ActorRef, Error, SystemConfig,
    actor::{Actor, ActorContext, ActorLifecycle},
    control::{ControlHandle, CreateReply},
    mailbox::{MailboxReceiver, MessageBody, StopAck, mailbox},
    proxy::ProxyRunner,
};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use tracing::{debug, error};

/// Builds an actor, starts its task (and its proxy's) and returns its public reference.
///
/// `reply` receives the reference once `on_start` has completed.
pub(crate) fn spawn(
    path: ActorPath,
    actor: Box<dyn Actor>,
    parent: Option<ActorRef>,
    control: ControlHandle,
    config: &SystemConfig,
    proxy: bool,
    reply: Option<CreateReply>,
) -> ActorRef {
    debug!("Creating actor {}.", path);
    let (sender, receiver) = mailbox(config.mailbox_capacity);

    let (reference, proxy) = if proxy {
        let (inbound_sender, inbound_receiver) = mailbox(config.proxy_inbound_capacity);
        let stop = CancellationToken::new();
        let proxy = ProxyRunner::new(
            path.clone(),
            sender,
            inbound_receiver,
            config.proxy_buffer_capacity,
            stop.clone(),
        );
        (ActorRef::new(path.clone(), inbound_sender), Some((proxy, stop)))
    } else {
        (ActorRef::new(path.clone(), sender), None)
    };

    let ctx = ActorContext::new(path.clone(), reference.clone(), parent, control);
    let runner = ActorRunner {
        path,
        actor,
        receiver,
        proxy_stop: proxy.as_ref().map(|(_, stop)| stop.clone()),
    };

    tokio::spawn(runner.init(ctx, reply));
    if let Some((proxy, _)) = proxy {
        tokio::spawn(proxy.run());
    }
    reference
}

/// Execution unit of one actor.
pub(crate) struct ActorRunner {
    path: ActorPath,
    actor: Box<dyn Actor>,
    receiver: MailboxReceiver,
    /// Stop signal of the proxy fronting this actor.
    proxy_stop: Option<CancellationToken>,
}

impl ActorRunner {
    /// Starts the behavior, then runs the receive loop until the actor stops.
    pub(crate) async fn init(
        mut self,
        mut ctx: ActorContext,
        reply: Option<CreateReply>,
    ) {
        debug!("Initializing actor {} runner.", self.path);

        if let Err(err) = self.actor.on_start(&mut ctx).await {
            error!("Actor {} failed to start: {}", self.path, err);
            self.stop(&mut ctx, None).await;
            if let Some(reply) = reply {
                let _ = reply.send(Err(Error::Start(self.path.clone(), err.to_string())));
            }
            self.close();
            return;
        }

        ctx.set_lifecycle(ActorLifecycle::Running);
        if let Some(reply) = reply {
            if reply.send(Ok(Some(ctx.own_reference()))).is_err() {
                debug!("Creator of actor {} is gone.", self.path);
            }
        }

        self.run(&mut ctx).await;
        self.close();
    }

    /// Receive loop.
    async fn run(&mut self, ctx: &mut ActorContext) {
        debug!("Running actor {}.", self.path);

        while let Some(envelope) = self.receiver.recv().await {
            ctx.set_sender(envelope.sender);
            match envelope.body {
                MessageBody::PoisonPill(ack) => {
                    debug!("Actor {} received a poison pill.", self.path);
                    self.stop(ctx, ack).await;
                    return;
                }
                MessageBody::User(message) => {
                    if let Err(err) = self.actor.receive(ctx, message).await {
                        error!("Actor {} failed handling a message: {}", self.path, err);
                        ctx.set_sender(None);
                        self.stop(ctx, None).await;
                        return;
                    }
                }
            }
            ctx.set_sender(None);
        }
    }

    /// Cascading stop.
    async fn stop(&mut self, ctx: &mut ActorContext, ack: Option<StopAck>) {
        ctx.set_lifecycle(ActorLifecycle::Stopping);
        let children = match ctx.control().children(self.path.clone()).await {
            Ok(children) => children,
            Err(err) => {
                error!("Actor {} can not list its children: {}", self.path, err);
                Vec::new()
            }
        };

        for child in children {
            let (child_ack, child_stopped) = oneshot::channel();
            if child
                .send_poison_pill(Some(ctx.own_reference()), Some(child_ack))
                .await
                .is_err()
            {
                debug!("Child {} is already stopped.", child.path());
                continue;
            }
            let _ = child_stopped.await;
        }

        if let Err(err) = self.actor.on_stop().await {
            error!("Actor {} failed to stop: {}", self.path, err);
        }
        ctx.set_sender(None);

        if let Err(err) = ctx.control().deregister(self.path.clone()).await {
            error!("Actor {} can not be deregistered: {}", self.path, err);
        }
        ctx.set_lifecycle(ActorLifecycle::Stopped);

        if let Some(ack) = ack {
            let _ = ack.send(());
        }

        if let Some(stop) = self.proxy_stop.take() {
            stop.cancel();
        }
    }

    /// Closes the mailbox and drops what is left in it.
    fn close(&mut self) {
        self.receiver.close();
        let mut dropped = 0;
        while let Ok(envelope) = self.receiver.try_recv() {
            match envelope.body {
                // Already stopped, which is what the pill asked for.
                MessageBody::PoisonPill(Some(ack)) => {
                    let _ = ack.send(());
                }
                MessageBody::PoisonPill(None) => {}
                MessageBody::User(_) => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!("Actor {} dropped {} undelivered messages.", self.path, dropped);
        }
        debug!("Actor {} is terminated.", self.path);
    }
}
