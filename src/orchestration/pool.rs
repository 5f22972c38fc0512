//! Worker pool: the fixed set of role specialists.
//!
//! Workers live in a `Vec` in creation order. Iteration order is the
//! tie-break order for scoring, so a standard pool always resolves equal
//! scores the same way.

use crate::worker::{Worker, WorkerId, WorkerRole, WorkerSnapshot, WorkerStatus};

/// The engine's worker roster.
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    pub fn new(workers: Vec<Worker>) -> Self {
        Self { workers }
    }

    /// The standard five-specialist pool in canonical order:
    /// planner, coder, reviewer, debugger, tester.
    pub fn standard() -> Self {
        Self::new(WorkerRole::specialists().map(Worker::new).into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn contains(&self, id: &WorkerId) -> bool {
        self.workers.iter().any(|w| &w.id == id)
    }

    pub fn get(&self, id: &WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| &w.id == id)
    }

    pub fn get_mut(&mut self, id: &WorkerId) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| &w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    /// Idle workers in pool order.
    pub fn idle(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter().filter(|w| w.is_available())
    }

    pub fn idle_count(&self) -> usize {
        self.idle().count()
    }

    /// Clear errored workers back to idle. Returns how many were reset.
    pub fn reset_errored(&mut self) -> usize {
        let mut reset = 0;
        for worker in &mut self.workers {
            if worker.status() == WorkerStatus::Error {
                worker.reset();
                reset += 1;
            }
        }
        reset
    }

    pub fn snapshots(&self) -> Vec<WorkerSnapshot> {
        self.workers.iter().map(|w| w.snapshot()).collect()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::standard()
    }
}
