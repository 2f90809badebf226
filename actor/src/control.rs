// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Control plane
//!
//! A single task that owns the registry of live actors and serializes every topology change.
//! Nothing else reads or writes the registry; contexts and runners talk to it through the
//! request queue wrapped by [`ControlHandle`].
//!

use crate::{
    ActorPath, ActorRef, Error, SystemConfig, actor::ActorBuilder, runner,
};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use tracing::debug;

use std::collections::{BTreeMap, HashMap};

/// Reply of a create request, sent by the new actor once started.
pub(crate) type CreateReply = oneshot::Sender<Result<Option<ActorRef>, Error>>;

/// Requests understood by the control plane.
pub(crate) enum ControlRequest {
    /// Resolve a path to the registered reference.
    Lookup {
        path: ActorPath,
        reply: oneshot::Sender<Option<ActorRef>>,
    },
    /// Create an actor `name` under `parent` (the root if `None`).
    Create {
        name: String,
        parent: Option<ActorRef>,
        builder: ActorBuilder,
        proxy: bool,
        reply: CreateReply,
    },
    /// Registered children of `path`, sorted by local name.
    Children {
        path: ActorPath,
        reply: oneshot::Sender<Vec<ActorRef>>,
    },
    /// Deregister `path`. Deregistering the root ends the control plane.
    Stop {
        path: ActorPath,
        reply: oneshot::Sender<()>,
    },
}

/// Sender side of the control plane queue.
#[derive(Clone)]
pub(crate) struct ControlHandle {
    sender: mpsc::Sender<ControlRequest>,
}

impl ControlHandle {
    pub(crate) fn new(sender: mpsc::Sender<ControlRequest>) -> Self {
        Self { sender }
    }

    async fn request<T, F>(&self, build: F) -> Result<T, Error>
    where
        F: FnOnce(oneshot::Sender<T>) -> ControlRequest,
    {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| Error::System)?;
        response.await.map_err(|_| Error::System)
    }

    pub(crate) async fn lookup(
        &self,
        path: ActorPath,
    ) -> Result<Option<ActorRef>, Error> {
        self.request(|reply| ControlRequest::Lookup { path, reply })
            .await
    }

    pub(crate) async fn create(
        &self,
        name: &str,
        parent: Option<ActorRef>,
        builder: ActorBuilder,
        proxy: bool,
    ) -> Result<Option<ActorRef>, Error> {
        self.request(|reply| ControlRequest::Create {
            name: name.to_owned(),
            parent,
            builder,
            proxy,
            reply,
        })
        .await?
    }

    pub(crate) async fn children(
        &self,
        path: ActorPath,
    ) -> Result<Vec<ActorRef>, Error> {
        self.request(|reply| ControlRequest::Children { path, reply })
            .await
    }

    pub(crate) async fn deregister(&self, path: ActorPath) -> Result<(), Error> {
        self.request(|reply| ControlRequest::Stop { path, reply })
            .await
    }
}

/// Live actors by path, with a per-parent index of children ordered by name.
#[derive(Default)]
pub(crate) struct Registry {
    actors: HashMap<ActorPath, ActorRef>,
    children: HashMap<ActorPath, BTreeMap<String, ActorRef>>,
}

impl Registry {
    pub(crate) fn contains(&self, path: &ActorPath) -> bool {
        self.actors.contains_key(path)
    }

    pub(crate) fn get(&self, path: &ActorPath) -> Option<ActorRef> {
        self.actors.get(path).cloned()
    }

    pub(crate) fn insert(&mut self, path: ActorPath, reference: ActorRef) {
        self.children
            .entry(path.parent())
            .or_default()
            .insert(path.key(), reference.clone());
        self.actors.insert(path, reference);
    }

    pub(crate) fn remove(&mut self, path: &ActorPath) -> Option<ActorRef> {
        let parent = path.parent();
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.remove(&path.key());
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
        self.actors.remove(path)
    }

    pub(crate) fn children(&self, path: &ActorPath) -> Vec<ActorRef> {
        self.children
            .get(path)
            .map(|children| children.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.actors.len()
    }
}

/// The control plane task.
pub(crate) struct ControlPlane {
    /// Reference of the system root, parent of actors created without parent.
    root: ActorRef,
    registry: Registry,
    config: SystemConfig,
    receiver: mpsc::Receiver<ControlRequest>,
    /// Handed to every actor created here.
    handle: ControlHandle,
    /// Cancelled when the loop ends.
    shutdown: CancellationToken,
}

impl ControlPlane {
    /// Builds the control plane. `root` must already be running; it gets registered here.
    pub(crate) fn new(
        root: ActorRef,
        config: SystemConfig,
        receiver: mpsc::Receiver<ControlRequest>,
        handle: ControlHandle,
        shutdown: CancellationToken,
    ) -> Self {
        let mut registry = Registry::default();
        registry.insert(root.path(), root.clone());
        Self {
            root,
            registry,
            config,
            receiver,
            handle,
            shutdown,
        }
    }

    /// Serves requests until the root is deregistered.
    pub(crate) async fn run(mut self) {
        let root_path = self.root.path();
        debug!("Starting actor system {}.", root_path);

        while let Some(request) = self.receiver.recv().await {
            match request {
                ControlRequest::Lookup { path, reply } => {
                    let _ = reply.send(self.registry.get(&path));
                }
                ControlRequest::Create {
                    name,
                    parent,
                    builder,
                    proxy,
                    reply,
                } => {
                    self.create(&name, parent, builder, proxy, reply);
                }
                ControlRequest::Children { path, reply } => {
                    let _ = reply.send(self.registry.children(&path));
                }
                ControlRequest::Stop { path, reply } => {
                    self.registry.remove(&path);
                    debug!(
                        "Actor {} deregistered, {} actors left.",
                        path,
                        self.registry.len()
                    );
                    let _ = reply.send(());
                    if path == root_path {
                        break;
                    }
                }
            }
        }

        debug!("Actor system {} stopped.", root_path);
        self.shutdown.cancel();
    }

    fn create(
        &mut self,
        name: &str,
        parent: Option<ActorRef>,
        builder: ActorBuilder,
        proxy: bool,
        reply: CreateReply,
    ) {
        if !is_local_name(name) {
            debug!("Actor name {:?} is not a single path segment.", name);
            let _ = reply.send(Err(Error::InvalidName(name.to_owned())));
            return;
        }
        let parent = parent.unwrap_or_else(|| self.root.clone());
        let path = parent.path() / name;
        if self.registry.contains(&path) {
            debug!("Actor {} already exists.", path);
            let _ = reply.send(Ok(None));
            return;
        }

        let reference = runner::spawn(
            path.clone(),
            builder(),
            Some(parent),
            self.handle.clone(),
            &self.config,
            proxy,
            Some(reply),
        );
        self.registry.insert(path, reference);
    }
}

/// A local name becomes exactly one segment of the child path.
fn is_local_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains('/')
}
