//! Fork-join execution of independent fallible tasks.
//!
//! A [`Batch`] runs every task it was given on the rayon pool and only
//! returns once all of them have finished, even when one fails early. Tasks
//! are never cancelled: every spawned process and open handle is drained
//! before the caller sees a result.

use rayon::prelude::*;

type Task<'a, T, E> = Box<dyn FnOnce() -> Result<T, E> + Send + 'a>;

/// A fixed set of independent tasks, joined together.
pub struct Batch<'a, T, E> {
    tasks: Vec<Task<'a, T, E>>,
}

impl<'a, T: Send, E: Send> Batch<'a, T, E> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Batch { tasks: Vec::new() }
    }

    /// Add a task.
    pub fn add(&mut self, task: impl FnOnce() -> Result<T, E> + Send + 'a) -> &mut Self {
        self.tasks.push(Box::new(task));
        self
    }

    /// Number of tasks in the batch.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run all tasks and wait for every one of them.
    ///
    /// Results are returned in the order the tasks were added. If any task
    /// failed, the error of the earliest failing task is returned.
    pub fn wait(self) -> Result<Vec<T>, E> {
        let results: Vec<Result<T, E>> = self.tasks.into_par_iter().map(|task| task()).collect();
        results.into_iter().collect()
    }
}

impl<T: Send, E: Send> Default for Batch<'_, T, E> {
    fn default() -> Self {
        Batch::new()
    }
}
