//! Unbounded fan-out of report units.

use log::{debug, warn};
use std::future::Future;
use tokio::task::JoinSet;

/// A batch of concurrently running units owned by one report run.
///
/// Units have no error channel: a unit that fails internally still finishes
/// normally, and one that panics is logged and counted as done, so [`wait`]
/// always returns once every unit has ended.
///
/// [`wait`]: TaskGroup::wait
pub struct TaskGroup<T> {
    name: &'static str,
    expected: usize,
    set: JoinSet<T>,
}

/// Outcome of [`TaskGroup::wait`].
#[derive(Debug)]
pub struct Completion<T> {
    /// Outputs of units that returned normally, in completion order.
    pub outputs: Vec<T>,
    /// Units that ended, including panicked ones.
    pub finished: usize,
    pub panicked: usize,
}

impl<T: Send + 'static> TaskGroup<T> {
    pub fn new(name: &'static str, expected: usize) -> Self {
        Self {
            name,
            expected,
            set: JoinSet::new(),
        }
    }

    pub fn spawn<F>(&mut self, unit: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.set.spawn(unit);
    }

    /// Blocks until every spawned unit has ended.
    pub async fn wait(mut self) -> Completion<T> {
        if self.set.len() != self.expected {
            debug!(
                "{}: expected {} units, spawned {}",
                self.name,
                self.expected,
                self.set.len()
            );
        }
        let mut outputs = Vec::with_capacity(self.set.len());
        let mut finished = 0;
        let mut panicked = 0;
        while let Some(joined) = self.set.join_next().await {
            finished += 1;
            match joined {
                Ok(output) => outputs.push(output),
                Err(err) => {
                    panicked += 1;
                    warn!("{}: unit ended abnormally: {}", self.name, err);
                }
            }
        }
        debug!("{}: {} units done", self.name, finished);
        Completion {
            outputs,
            finished,
            panicked,
        }
    }
}
