//! Periodic tick tasks
//!
//! Each task is a tokio interval loop that sends a [`TickKind`] into the event
//! loop's channel. Tasks are owned by the [`Scheduler`] and aborted when it is
//! shut down or dropped, so no timer outlives the view that started it.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::error::{MnemographError, Result};

/// What a periodic tick is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TickKind {
    /// Refresh "now" so node colors follow the decay
    Clock,
    /// Redraw the retention curve of the selected node
    Curve,
    /// Request a new snapshot
    Poll,
}

impl fmt::Display for TickKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TickKind::Clock => "clock",
            TickKind::Curve => "curve",
            TickKind::Poll => "poll",
        };
        f.write_str(name)
    }
}

/// Handle to one periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct PeriodicTask {
    kind: TickKind,
    handle: JoinHandle<()>,
}

/// Owns every periodic task started by the viewer
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    tasks: HashMap<TaskId, PeriodicTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start sending `kind` every `period`; the first tick fires one period
    /// from now. The task ends on its own once the receiver is dropped.
    pub fn spawn_periodic<E>(
        &mut self,
        kind: TickKind,
        period: Duration,
        sender: mpsc::UnboundedSender<E>,
    ) -> Result<TaskId>
    where
        E: From<TickKind> + Send + 'static,
    {
        if period.is_zero() {
            return Err(MnemographError::Config(format!(
                "{kind} tick period must be greater than zero"
            )));
        }

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if sender.send(E::from(kind)).is_err() {
                    tracing::debug!(%kind, "Tick receiver closed, stopping task");
                    break;
                }
            }
        });

        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.insert(id, PeriodicTask { kind, handle });
        tracing::debug!(%kind, period_ms = period.as_millis() as u64, "Periodic task started");
        Ok(id)
    }

    /// Stop one task. Returns `false` if the id is unknown.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.tasks.remove(&id) {
            Some(task) => {
                task.handle.abort();
                tracing::debug!(kind = %task.kind, "Periodic task cancelled");
                true
            }
            None => false,
        }
    }

    /// Number of tasks still running
    pub fn active(&self) -> usize {
        self.tasks.values().filter(|task| !task.handle.is_finished()).count()
    }

    /// Stop every task
    pub fn shutdown(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.handle.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
