// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle tests: creation, lookup, messaging and cascading stop.

use actor::{
    Actor, ActorContext, ActorLifecycle, ActorPath, ActorRef, ActorSystem,
    DefaultActor, Error, Message,
};
use async_trait::async_trait;

use tokio::sync::{Mutex, Notify, mpsc};

use std::{sync::Arc, time::Duration};

type Journal = Arc<Mutex<Vec<String>>>;

// Records its start and stop, and creates the given children while starting.
struct Recorder {
    label: String,
    journal: Journal,
    children: Vec<&'static str>,
}

impl Recorder {
    fn new(label: &str, journal: &Journal) -> Self {
        Self {
            label: label.to_owned(),
            journal: journal.clone(),
            children: Vec::new(),
        }
    }

    fn with_children(mut self, children: &[&'static str]) -> Self {
        self.children = children.to_vec();
        self
    }
}

#[async_trait]
impl Actor for Recorder {
    async fn on_start(&mut self, ctx: &mut ActorContext) -> Result<(), Error> {
        self.journal.lock().await.push(format!("Start-{}", self.label));
        for name in self.children.clone() {
            let label = format!("{}/{}", self.label, name);
            let journal = self.journal.clone();
            ctx.create_child(name, move || Recorder::new(&label, &journal))
                .await?;
        }
        Ok(())
    }

    async fn on_stop(&mut self) -> Result<(), Error> {
        self.journal.lock().await.push(format!("Stop-{}", self.label));
        Ok(())
    }
}

#[tokio::test]
async fn test_stop_order_of_siblings() {
    let journal = Journal::default();
    let mut system = ActorSystem::create("test");

    for name in ["1", "2"] {
        let recorder = Recorder::new(name, &journal);
        system
            .context()
            .create_child(name, move || recorder)
            .await
            .unwrap()
            .unwrap();
    }

    system.shutdown().await.unwrap();

    assert_eq!(
        *journal.lock().await,
        vec!["Start-1", "Start-2", "Stop-1", "Stop-2"]
    );
}

#[tokio::test]
async fn test_nested_stop_is_depth_first() {
    let journal = Journal::default();
    let mut system = ActorSystem::create("test");

    let a = Recorder::new("a", &journal).with_children(&["y", "x"]);
    system.context().create_child("a", move || a).await.unwrap();
    let b = Recorder::new("b", &journal).with_children(&["z"]);
    system.context().create_child("b", move || b).await.unwrap();

    system.shutdown().await.unwrap();

    assert_eq!(
        *journal.lock().await,
        vec![
            "Start-a", "Start-a/y", "Start-a/x", "Start-b", "Start-b/z",
            "Stop-a/x", "Stop-a/y", "Stop-a", "Stop-b/z", "Stop-b",
        ]
    );
}

#[tokio::test]
async fn test_system_is_running_until_root_stops() {
    let system = ActorSystem::create("test");
    assert!(system.is_running());
    assert_eq!(system.root().path(), ActorPath::from("/test"));

    let root = system.root();
    tokio::spawn(async move { root.ask_stop().await });

    tokio::time::timeout(Duration::from_secs(5), system.wait())
        .await
        .unwrap();
    assert!(!system.is_running());
}

#[tokio::test]
async fn test_name_collision_and_lookup() {
    let mut system = ActorSystem::create("test");
    let ctx = system.context();

    let first = ctx.create_child("a", || DefaultActor).await.unwrap().unwrap();
    assert_eq!(first.path(), ActorPath::from("/test/a"));
    assert!(ctx.create_child("a", || DefaultActor).await.unwrap().is_none());
    assert!(ctx.create_proxy_child("a", || DefaultActor).await.unwrap().is_none());

    let found = ctx.find_actor("/test/a").await.unwrap().unwrap();
    assert_eq!(found, first);
    assert_eq!(ctx.get_child("a"), Some(first));
    assert!(ctx.find_actor("/test/b").await.unwrap().is_none());
    assert!(ctx.find_actor("/other").await.unwrap().is_none());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_name_must_be_one_segment() {
    let journal = Journal::default();
    let mut system = ActorSystem::create("test");
    let ctx = system.context();

    for name in ["x/y", "/x", "", " "] {
        let recorder = Recorder::new(name, &journal);
        assert_eq!(
            ctx.create_child(name, move || recorder).await,
            Err(Error::InvalidName(name.to_owned()))
        );
    }
    assert!(ctx.find_actor("/test/x/y").await.unwrap().is_none());
    assert!(ctx.find_actor("/test/x").await.unwrap().is_none());

    system.shutdown().await.unwrap();
    // No behavior was ever started, so none can outlive the system.
    assert!(journal.lock().await.is_empty());
}

#[tokio::test]
async fn test_stopped_actor_is_unreachable() {
    let mut system = ActorSystem::create("test");
    let ctx = system.context();
    let a = ctx.create_child("a", || DefaultActor).await.unwrap().unwrap();

    a.ask_stop().await.unwrap();

    assert!(ctx.find_actor("/test/a").await.unwrap().is_none());
    // The mailbox is closed right after the acknowledgment.
    tokio::time::timeout(Duration::from_secs(5), async {
        while !a.is_closed() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(
        a.send(None, "late").await,
        Err(Error::Send("/test/a".to_owned()))
    );
    // The name is free again.
    assert!(ctx.create_child("a", || DefaultActor).await.unwrap().is_some());

    system.shutdown().await.unwrap();
}

struct Ping {
    rounds: usize,
    done: mpsc::Sender<usize>,
}

#[async_trait]
impl Actor for Ping {
    async fn receive(
        &mut self,
        ctx: &mut ActorContext,
        message: Message,
    ) -> Result<(), Error> {
        match message.downcast_ref::<&str>().copied() {
            Some("start") => {}
            Some("pong") => self.rounds += 1,
            _ => return Err(Error::Functional("unexpected message".to_owned())),
        }
        if self.rounds == 3 {
            let _ = self.done.send(self.rounds).await;
            return Ok(());
        }
        let pong = ctx
            .find_actor("/test/pong")
            .await?
            .ok_or_else(|| Error::Functional("pong not found".to_owned()))?;
        pong.send(ctx.reference(), "ping").await
    }
}

struct Pong;

#[async_trait]
impl Actor for Pong {
    async fn receive(
        &mut self,
        ctx: &mut ActorContext,
        message: Message,
    ) -> Result<(), Error> {
        assert_eq!(message.downcast_ref::<&str>(), Some(&"ping"));
        assert_eq!(ctx.lifecycle(), ActorLifecycle::Running);
        let sender = ctx
            .sender()
            .ok_or_else(|| Error::Functional("ping without sender".to_owned()))?;
        assert_eq!(sender.path(), ActorPath::from("/test/ping"));
        sender.send(ctx.reference(), "pong").await
    }
}

#[tokio::test]
async fn test_ping_pong() {
    let mut system = ActorSystem::create("test");
    let (done, mut rounds) = mpsc::channel(1);

    system.context().create_child("pong", || Pong).await.unwrap();
    let ping = system
        .context()
        .create_child("ping", move || Ping { rounds: 0, done })
        .await
        .unwrap()
        .unwrap();

    ping.send(None, "start").await.unwrap();
    let rounds = tokio::time::timeout(Duration::from_secs(5), rounds.recv())
        .await
        .unwrap();
    assert_eq!(rounds, Some(3));

    system.shutdown().await.unwrap();
}

struct FailingStart;

#[async_trait]
impl Actor for FailingStart {
    async fn on_start(&mut self, _ctx: &mut ActorContext) -> Result<(), Error> {
        Err(Error::Functional("boom".to_owned()))
    }
}

#[tokio::test]
async fn test_failing_start() {
    let mut system = ActorSystem::create("test");
    let ctx = system.context();

    let result = ctx.create_child("broken", || FailingStart).await;
    assert_eq!(
        result,
        Err(Error::Start(
            ActorPath::from("/test/broken"),
            "Error: boom".to_owned()
        ))
    );
    assert!(ctx.find_actor("/test/broken").await.unwrap().is_none());
    assert!(ctx.get_child("broken").is_none());

    system.shutdown().await.unwrap();
}

struct FailingReceive;

#[async_trait]
impl Actor for FailingReceive {
    async fn receive(
        &mut self,
        _ctx: &mut ActorContext,
        _message: Message,
    ) -> Result<(), Error> {
        Err(Error::Functional("bad message".to_owned()))
    }
}

#[tokio::test]
async fn test_failing_receive_stops_actor() {
    let mut system = ActorSystem::create("test");
    let ctx = system.context();
    let actor = ctx.create_child("fragile", || FailingReceive).await.unwrap().unwrap();

    actor.send(None, 1_u8).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while ctx.find_actor("/test/fragile").await.unwrap().is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    system.shutdown().await.unwrap();
}

// Blocks on its first message until the gate opens, then records what it gets.
struct Gated {
    gate: Arc<Notify>,
    received: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl Actor for Gated {
    async fn receive(
        &mut self,
        ctx: &mut ActorContext,
        message: Message,
    ) -> Result<(), Error> {
        match message.downcast::<usize>() {
            Ok(value) => {
                let mut received = self.received.lock().await;
                if received.is_empty() {
                    self.gate.notified().await;
                }
                received.push(value);
            }
            // Anything else is a probe, answered once everything before it is handled.
            Err(probe) => {
                if let Some(sender) = ctx.sender() {
                    sender.send(ctx.reference(), probe).await?;
                }
            }
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_proxy_keeps_order_under_backpressure() {
    let mut system = ActorSystem::create("test");
    let gate = Arc::new(Notify::new());
    let received = Arc::new(Mutex::new(Vec::new()));

    let gated = Gated {
        gate: gate.clone(),
        received: received.clone(),
    };
    let proxy = system
        .context()
        .create_proxy_child("gated", move || gated)
        .await
        .unwrap()
        .unwrap();

    // Far more than the mailbox holds, while the actor is blocked.
    tokio::time::timeout(Duration::from_secs(5), async {
        for i in 0..200_usize {
            proxy.send(None, i).await.unwrap();
        }
    })
    .await
    .unwrap();

    gate.notify_one();
    let mut probe = proxy.ask("probe").await.unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(5), probe.get_result())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.downcast_ref::<&str>(), Some(&"probe"));

    assert_eq!(*received.lock().await, (0..200).collect::<Vec<usize>>());
    system.shutdown().await.unwrap();
}

// Creates a worker while starting and stops it on request.
struct Supervisor {
    worker: Option<ActorRef>,
    journal: Journal,
}

#[async_trait]
impl Actor for Supervisor {
    async fn on_start(&mut self, ctx: &mut ActorContext) -> Result<(), Error> {
        let journal = self.journal.clone();
        self.worker = ctx
            .create_child("worker", move || Worker { journal })
            .await?;
        Ok(())
    }

    async fn receive(
        &mut self,
        ctx: &mut ActorContext,
        message: Message,
    ) -> Result<(), Error> {
        if message.downcast_ref::<&str>() == Some(&"stop worker") {
            if let Some(worker) = self.worker.take() {
                ctx.stop(&worker).await?;
            }
        }
        Ok(())
    }
}

struct Worker {
    journal: Journal,
}

#[async_trait]
impl Actor for Worker {
    async fn on_start(&mut self, ctx: &mut ActorContext) -> Result<(), Error> {
        let parent = ctx
            .parent()
            .map(|parent| parent.path().to_string())
            .unwrap_or_default();
        self.journal.lock().await.push(format!("Parent-{}", parent));
        Ok(())
    }

    async fn on_stop(&mut self) -> Result<(), Error> {
        self.journal.lock().await.push("Stop-worker".to_owned());
        Ok(())
    }
}

#[tokio::test]
async fn test_stop_child_from_receive() {
    let journal = Journal::default();
    let mut system = ActorSystem::create("test");
    let supervisor_journal = journal.clone();
    let supervisor = system
        .context()
        .create_child("supervisor", move || Supervisor {
            worker: None,
            journal: supervisor_journal,
        })
        .await
        .unwrap()
        .unwrap();
    assert!(system.context().parent().is_none());

    let ctx = system.context();
    assert!(ctx.find_actor("/test/supervisor/worker").await.unwrap().is_some());

    supervisor.send(None, "stop worker").await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while ctx
            .find_actor("/test/supervisor/worker")
            .await
            .unwrap()
            .is_some()
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(
        *journal.lock().await,
        vec!["Parent-/test/supervisor", "Stop-worker"]
    );
    // The supervisor itself keeps running.
    assert!(ctx.find_actor("/test/supervisor").await.unwrap().is_some());

    system.shutdown().await.unwrap();
}
