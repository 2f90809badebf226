// Copyright 2024 Antonio Estévez
// SPDX-License-Identifier: Apache-2.0

//! # Errors module
//!

use crate::ActorPath;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for the actor system.
///
/// Name collisions and failed lookups are not errors: they are reported as `Ok(None)` by
/// the operations that can produce them.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// The target mailbox is closed, the actor behind the reference has stopped.
    #[error("An error occurred while sending a message to actor: {0}.")]
    Send(String),
    /// The behavior failed in `on_start`.
    #[error("Actor {0} could not be started: {1}")]
    Start(ActorPath, String),
    /// A local actor name must be a single non-empty path segment.
    #[error("Invalid actor name: {0:?}")]
    InvalidName(String),
    /// A topology change was requested by an actor that is already stopping.
    #[error("Actor {0} is stopping.")]
    Stopping(ActorPath),
    /// The control plane does not answer anymore, the system has shut down.
    #[error("The actor system is not running.")]
    System,
    /// Invalid system configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Error raised by behavior code.
    #[error("Error: {0}")]
    Functional(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::Start(ActorPath::from("/test/a"), "boom".to_owned());
        assert_eq!(error.to_string(), "Actor /test/a could not be started: boom");
        assert_eq!(
            Error::Send("/test/a".to_owned()).to_string(),
            "An error occurred while sending a message to actor: /test/a."
        );
    }
}
