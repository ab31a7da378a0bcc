//! Live collection of tasks
//!
//! A [`LiveTasks`] is a continuously updating view of the newest-first task
//! list. It reports `None` while loading, which is distinct from an empty
//! list. Snapshots are delivered through a `tokio::sync::watch` channel, so a
//! slow reader may skip intermediate states but always converges on the
//! latest one.

use tokio::sync::watch;

use crate::task::Task;
use crate::{Error, Result};

/// Latest known list, `None` until the first snapshot arrives
pub type Snapshot = Option<Vec<Task>>;

/// Producer side of a live collection
#[derive(Debug)]
pub struct LivePublisher {
    tx: watch::Sender<Snapshot>,
}

impl LivePublisher {
    /// Create a publisher that starts in the loading state
    pub fn loading() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Create a publisher seeded with an initial snapshot
    pub fn with_snapshot(tasks: Vec<Task>) -> Self {
        let (tx, _) = watch::channel(Some(tasks));
        Self { tx }
    }

    /// Replace the current snapshot and wake every subscriber
    pub fn publish(&self, tasks: Vec<Task>) {
        self.tx.send_replace(Some(tasks));
    }

    pub fn subscribe(&self) -> LiveTasks {
        LiveTasks::new(self.tx.subscribe())
    }
}

/// Consumer side of a live collection
#[derive(Debug, Clone)]
pub struct LiveTasks {
    rx: watch::Receiver<Snapshot>,
}

impl LiveTasks {
    pub fn new(rx: watch::Receiver<Snapshot>) -> Self {
        Self { rx }
    }

    /// Clone out the latest snapshot
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Hand out the underlying receiver, e.g. to build a stream
    pub fn into_inner(self) -> watch::Receiver<Snapshot> {
        self.rx
    }

    pub fn is_loading(&self) -> bool {
        self.rx.borrow().is_none()
    }

    /// Wait until a snapshot newer than the last one seen is available
    pub async fn changed(&mut self) -> Result<()> {
        self.rx.changed().await.map_err(|_| Error::Disconnected)
    }

    /// Wait until a loaded snapshot satisfies `predicate` and return it
    pub async fn wait_until<F>(&mut self, mut predicate: F) -> Result<Vec<Task>>
    where
        F: FnMut(&[Task]) -> bool,
    {
        let snapshot = self
            .rx
            .wait_for(|snapshot| snapshot.as_deref().is_some_and(&mut predicate))
            .await
            .map_err(|_| Error::Disconnected)?;
        Ok(snapshot.as_deref().map(<[Task]>::to_vec).unwrap_or_default())
    }
}
