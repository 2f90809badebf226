// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # System configuration
//!

use crate::Error;

use serde::{Deserialize, Serialize};

/// Default capacity of an actor mailbox.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 10;

/// Default capacity of the control plane request queue.
pub const DEFAULT_CONTROL_CAPACITY: usize = 100;

/// Channel sizes used by an actor system.
///
/// Every field has a default, so a partial document deserializes with any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Capacity of each actor mailbox. A full mailbox makes senders wait.
    pub mailbox_capacity: usize,
    /// Capacity of the control plane request queue.
    pub control_capacity: usize,
    /// Capacity of the inbound queue of a proxy.
    pub proxy_inbound_capacity: usize,
    /// Initial capacity of the proxy buffer. The buffer itself is unbounded.
    pub proxy_buffer_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            control_capacity: DEFAULT_CONTROL_CAPACITY,
            proxy_inbound_capacity: 1,
            proxy_buffer_capacity: 10,
        }
    }
}

impl SystemConfig {
    /// Sets the mailbox capacity.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Sets the control plane queue capacity.
    pub fn with_control_capacity(mut self, capacity: usize) -> Self {
        self.control_capacity = capacity;
        self
    }

    /// Sets the capacity of the inbound queue of each proxy.
    pub fn with_proxy_inbound_capacity(mut self, capacity: usize) -> Self {
        self.proxy_inbound_capacity = capacity;
        self
    }

    /// Sets the initial capacity of each proxy buffer.
    pub fn with_proxy_buffer_capacity(mut self, capacity: usize) -> Self {
        self.proxy_buffer_capacity = capacity;
        self
    }

    /// Checks that every bounded channel can be built. Tokio channels need a non-zero capacity.
    pub fn validate(&self) -> Result<(), Error> {
        if self.mailbox_capacity == 0 {
            return Err(Error::Config("mailbox_capacity must be greater than 0".to_owned()));
        }
        if self.control_capacity == 0 {
            return Err(Error::Config("control_capacity must be greater than 0".to_owned()));
        }
        if self.proxy_inbound_capacity == 0 {
            return Err(Error::Config(
                "proxy_inbound_capacity must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}
