// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor system
//!
//! The `system` module provides the `ActorSystem` type. It bootstraps the control plane and
//! the root actor, and lets callers watch the system until it shuts down.
//!

use crate::{
    ActorContext, ActorPath, ActorRef, Error, SystemConfig,
    actor::{ActorLifecycle, DefaultActor},
    control::{ControlHandle, ControlPlane},
    runner,
};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use tracing::debug;

/// Actor system.
///
/// Owns the context of the root actor `/<name>`. Every actor created through that context is
/// a child of the root, and stopping the root stops the whole system.
///
/// ```ignore
/// let mut system = ActorSystem::create("test");
/// let echo = system.context().create_child("echo", || Echo).await?;
/// // ...
/// system.shutdown().await?;
/// ```
pub struct ActorSystem {
    name: String,
    config: SystemConfig,
    /// Root context. Its children map records what was created through it.
    context: ActorContext,
    /// Cancelled once the control plane has ended.
    shutdown: CancellationToken,
}

impl ActorSystem {
    /// Creates an actor system with the default configuration.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn create(name: &str) -> Self {
        Self::start(name, SystemConfig::default())
    }

    /// Creates an actor system with the given configuration.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the configuration is invalid.
    pub fn with_config(name: &str, config: SystemConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::start(name, config))
    }

    fn start(name: &str, config: SystemConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.control_capacity);
        let control = ControlHandle::new(sender);
        let shutdown = CancellationToken::new();
        let path = ActorPath::from("/") / name;

        debug!("Creating actor system {}.", path);
        let root = runner::spawn(
            path.clone(),
            Box::new(DefaultActor),
            None,
            control.clone(),
            &config,
            false,
            None,
        );
        let plane = ControlPlane::new(
            root.clone(),
            config.clone(),
            receiver,
            control.clone(),
            shutdown.clone(),
        );
        tokio::spawn(plane.run());

        let mut context = ActorContext::new(path, root, None, control);
        context.set_lifecycle(ActorLifecycle::Running);

        Self {
            name: name.to_owned(),
            config,
            context,
            shutdown,
        }
    }

    /// Name of the system.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the system was created with.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Context of the root actor.
    pub fn context(&mut self) -> &mut ActorContext {
        &mut self.context
    }

    /// Reference of the root actor.
    pub fn root(&self) -> ActorRef {
        self.context.own_reference()
    }

    /// True until the root actor has stopped and the control plane has ended.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Waits until the system has shut down.
    pub async fn wait(&self) {
        self.shutdown.cancelled().await;
    }

    /// Stops the root actor, and with it every actor, then waits for the system to end.
    pub async fn shutdown(&self) -> Result<(), Error> {
        if self.is_running() {
            self.root().ask_stop().await?;
        }
        self.wait().await;
        Ok(())
    }
}
