// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Core library for the Troupe framework.
//! Provides the in-process actor runtime: hierarchical actors, bounded mailboxes, ask futures
//! and cascading shutdown.

pub use actor::{
    Actor, ActorContext, ActorFactory, ActorLifecycle, ActorPath, ActorRef,
    ActorSystem, AskFuture, DefaultActor, Error as ActorError, Message,
    SystemConfig,
};
