//! Spawns backend requests as abortable tasks and funnels their outcomes
//! back to the owner of the state.

use std::future::Future;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;

use crate::action::Feature;
use crate::errors::ActionError;

/// Outcome of one spawned request, tagged so the owner can discard stale ones.
#[derive(Debug)]
pub(crate) struct Completion {
    pub feature: Feature,
    pub generation: u64,
    pub outcome: Result<String, ActionError>,
}

#[derive(Debug)]
pub(crate) struct TaskSupervisor {
    next_generation: u64,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl TaskSupervisor {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            next_generation: 0,
            tx,
            rx,
        }
    }

    /// Spawn `task` on the current tokio runtime.
    ///
    /// An aborted task never reports back.
    pub(crate) fn spawn<F>(&mut self, feature: Feature, task: F) -> (u64, AbortHandle)
    where
        F: Future<Output = Result<String, ActionError>> + Send + 'static,
    {
        self.next_generation += 1;
        let generation = self.next_generation;
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            if let Ok(outcome) = Abortable::new(task, abort_registration).await {
                let _ = tx.send(Completion {
                    feature,
                    generation,
                    outcome,
                });
            }
        });

        (generation, abort_handle)
    }

    pub(crate) fn try_next(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next completion. Pending forever when nothing is in flight.
    pub(crate) async fn next(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }
}
