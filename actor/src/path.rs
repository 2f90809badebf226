// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor path
//!
//! The `path` module provides the `ActorPath` type, the hierarchical address under which the
//! control plane registers every live actor.
//!

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt::{Error, Formatter};

/// Hierarchical actor address.
///
/// A path is an ordered list of segments displayed as `/system/parent/child`. The root actor of
/// a system named `test` lives at `/test`, and every actor created under it gets the path
/// `parent / name`. Paths are the registry key of the control plane, so two live actors never
/// share one.
///
/// Segments are produced by splitting on `/` and dropping empty pieces, which means
/// `ActorPath::from("/test/")`, `ActorPath::from("test")` and `ActorPath::from("/test")` are the
/// same path, and joining an empty name onto a path yields that same path.
///
/// ```ignore
/// use actor::ActorPath;
///
/// let root = ActorPath::from("/test");
/// let child = root.clone() / "worker";
/// assert_eq!(child.to_string(), "/test/worker");
/// assert_eq!(child.parent(), root);
/// assert_eq!(child.key(), "worker");
/// ```
#[derive(
    Clone, Default, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ActorPath(Vec<String>);

impl ActorPath {
    /// Returns the path of the enclosing actor. The parent of a single segment path (a system
    /// root) is the empty path `/`.
    pub fn parent(&self) -> Self {
        if self.0.len() > 1 {
            let mut tokens = self.0.clone();
            tokens.truncate(tokens.len() - 1);
            ActorPath(tokens)
        } else {
            ActorPath(Vec::new())
        }
    }

    /// Local name of the actor, the last segment. Empty for the empty path.
    pub fn key(&self) -> String {
        self.0.last().cloned().unwrap_or_default()
    }

    /// Number of segments.
    pub fn level(&self) -> usize {
        self.0.len()
    }
}

fn tokenize(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|x| !x.trim().is_empty())
        .map(|s| s.to_string())
        .collect()
}

impl From<&str> for ActorPath {
    fn from(str: &str) -> Self {
        ActorPath(tokenize(str))
    }
}

impl From<String> for ActorPath {
    fn from(string: String) -> Self {
        ActorPath::from(string.as_str())
    }
}

impl From<&String> for ActorPath {
    fn from(string: &String) -> Self {
        ActorPath::from(string.as_str())
    }
}

impl From<&ActorPath> for ActorPath {
    fn from(path: &ActorPath) -> Self {
        path.clone()
    }
}

/// Joins a local name onto a path: `ActorPath::from("/test") / "echo"` is `/test/echo`.
impl std::ops::Div<&str> for ActorPath {
    type Output = ActorPath;

    fn div(self, rhs: &str) -> Self::Output {
        let mut keys = self.0;
        keys.append(&mut tokenize(rhs));
        ActorPath(keys)
    }
}

impl std::fmt::Display for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self.level().cmp(&1) {
            Ordering::Less => write!(f, "/"),
            Ordering::Equal => write!(f, "/{}", self.0[0]),
            Ordering::Greater => write!(f, "/{}", self.0.join("/")),
        }
    }
}

impl std::fmt::Debug for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        std::fmt::Display::fmt(self, f)
    }
}
