// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Troupe actor runtime
//!
//! An in-process actor runtime built on tokio. Actors are independent units of state and
//! behavior that live in a tree, communicate only by asynchronous messages and are addressed
//! by hierarchical paths such as `/system/parent/child`.
//!
//! ## Overview
//!
//! In response to a message, an actor can:
//! - Update its private state
//! - Create child actors
//! - Send messages to any actor it holds a reference to, including itself
//! - Look actors up by path
//! - Stop other actors
//!
//! ## Core Architecture
//!
//! ### Actor tree
//!
//! Every [`ActorSystem`] owns a root actor `/<name>`. Actors created through the system context
//! are children of the root, and every actor can create children of its own. Stopping an actor
//! stops its whole subtree first, depth first and in name order, so parents always outlive
//! their children.
//!
//! ### Control plane
//!
//! A single task per system owns the registry of live actors. Creations, lookups and
//! deregistrations are requests to that task, so the registry is never shared and topology
//! changes are totally ordered.
//!
//! ### Messages
//!
//! A [`Message`] is an opaque payload of any `Send` type. Each actor processes one message at a
//! time, in arrival order, with the declared sender available through [`ActorContext::sender`].
//! Mailboxes are bounded: senders wait while a mailbox is full. Actors created with
//! [`ActorContext::create_proxy_child`] accept messages without ever blocking the sender.
//!
//! ### Ask
//!
//! [`ActorRef::ask`] sends a message whose sender is an [`AskFuture`]. The first reply written
//! to the future becomes its result.
//!
//! ## Getting Started
//!
//! ```ignore
//! use actor::{Actor, ActorContext, ActorSystem, Error, Message};
//! use async_trait::async_trait;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Actor for Echo {
//!     async fn receive(&mut self, ctx: &mut ActorContext, message: Message) -> Result<(), Error> {
//!         if let Some(sender) = ctx.sender() {
//!             sender.send(ctx.reference(), message).await?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let mut system = ActorSystem::create("demo");
//!     let echo = system
//!         .context()
//!         .create_child("echo", || Echo)
//!         .await?
//!         .ok_or_else(|| Error::Functional("echo exists".to_owned()))?;
//!
//!     let mut future = echo.ask("hello").await?;
//!     let reply = future.get_result().await;
//!     assert_eq!(reply.and_then(|m| m.downcast::<&str>().ok()), Some("hello"));
//!
//!     system.shutdown().await
//! }
//! ```
//!
//! ## API Organization
//!
//! - **Core Actor Types**: [`Actor`], [`ActorContext`], [`ActorRef`], [`Message`], [`AskFuture`]
//! - **Behavior Construction**: [`ActorFactory`], [`DefaultActor`]
//! - **System Management**: [`ActorSystem`], [`SystemConfig`], [`ActorLifecycle`]
//! - **Actor Addressing**: [`ActorPath`]
//! - **Error Handling**: [`Error`]
//!

mod actor;
mod config;
mod control;
mod error;
mod future;
mod mailbox;
mod path;
mod proxy;
mod runner;
mod system;

//
// Core Actor Types
//

/// Behavior of an actor: `on_start`, `receive` and `on_stop` hooks.
pub use actor::Actor;

/// Per-actor facade handed to every hook. Creates, finds and stops actors.
pub use actor::ActorContext;

/// Cloneable address of an actor, or of an [`AskFuture`].
pub use actor::ActorRef;

/// Opaque payload exchanged between actors.
pub use mailbox::Message;

/// One-shot reply slot returned by [`ActorRef::ask`].
pub use future::AskFuture;

//
// Behavior Construction
//

/// Reusable source of behavior instances.
pub use actor::ActorFactory;

/// Behavior that ignores every message.
pub use actor::DefaultActor;

//
// System Management
//

/// Lifecycle states of an actor.
pub use actor::ActorLifecycle;

/// Entry point: bootstraps the control plane and the root actor.
pub use system::ActorSystem;

/// Channel capacities of an actor system.
pub use config::SystemConfig;

//
// Actor Addressing
//

/// Hierarchical path identifying an actor.
pub use path::ActorPath;

//
// Error Handling
//

/// Error type of every fallible operation.
pub use error::Error;
