use crate::error::{Result, ScoutError};
use crate::orchestrator::MissionReport;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug)]
pub enum TickOutcome {
    Completed(MissionReport),
    Failed(String),
    Panicked(String),
}

#[derive(Debug)]
pub struct Tick {
    pub query: String,
    pub outcome: TickOutcome,
    /// How long to wait before the next tick.
    pub pause: Duration,
}

/// Rotates through a fixed list of queries, running one mission per tick.
/// A failed or panicking mission is logged and the rotation moves on.
pub struct Scheduler<F> {
    queries: Vec<String>,
    query_cooldown: Duration,
    rotation_cooldown: Duration,
    next: usize,
    mission: F,
}

impl<F> Scheduler<F>
where
    F: FnMut(&str) -> Result<MissionReport>,
{
    pub fn new(
        queries: Vec<String>,
        query_cooldown: Duration,
        rotation_cooldown: Duration,
        mission: F,
    ) -> Result<Self> {
        if queries.is_empty() {
            return Err(ScoutError::Config("scheduler needs at least one query".to_string()));
        }
        Ok(Self {
            queries,
            query_cooldown,
            rotation_cooldown,
            next: 0,
            mission,
        })
    }

    /// The query the next [`Scheduler::step`] runs.
    pub fn next_query(&self) -> &str {
        &self.queries[self.next]
    }

    pub fn step(&mut self) -> Tick {
        let query = self.next_query().to_string();
        info!(query = %query, "scheduled mission starting");

        let mission = &mut self.mission;
        let outcome = match catch_unwind(AssertUnwindSafe(|| mission(&query))) {
            Ok(Ok(report)) => {
                info!(
                    query = %query,
                    state = ?report.state,
                    found = report.found,
                    engaged = report.engaged,
                    "scheduled mission finished"
                );
                TickOutcome::Completed(report)
            }
            Ok(Err(err)) => {
                error!(query = %query, error = %err, "scheduled mission failed");
                TickOutcome::Failed(err.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(query = %query, panic = %message, "scheduled mission panicked");
                TickOutcome::Panicked(message)
            }
        };

        self.next = (self.next + 1) % self.queries.len();
        let pause = if self.next == 0 {
            self.rotation_cooldown
        } else {
            self.query_cooldown
        };
        Tick {
            query,
            outcome,
            pause,
        }
    }

    /// Runs until the process stops.
    pub fn run_forever(&mut self) -> ! {
        loop {
            let tick = self.step();
            info!(secs = tick.pause.as_secs(), "scheduler sleeping");
            thread::sleep(tick.pause);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
