//! Capability scoring: pure suitability of a worker for a task.
//!
//! Scores live in `[0.0, 1.0]` and depend only on the worker's role and
//! capability tags and the task description. Same inputs, same score.

use crate::core::task::Task;
use crate::worker::{Worker, WorkerId, WorkerRole};

/// Role affinity table: (role, trigger keywords, score on match, fallback).
///
/// Keywords match as substrings of the lowercased description, so "test"
/// also fires on "testing".
const ROLE_AFFINITY: &[(WorkerRole, &[&str], f64, f64)] = &[
    (WorkerRole::Planner, &["plan"], 0.8, 0.2),
    (
        WorkerRole::Coder,
        &["code", "implement", "write", "create"],
        0.9,
        0.3,
    ),
    (
        WorkerRole::Reviewer,
        &["review", "check", "validate"],
        0.9,
        0.2,
    ),
    (WorkerRole::Debugger, &["debug", "fix", "error"], 0.9, 0.1),
    (WorkerRole::Tester, &["test", "verify", "validate"], 0.9, 0.2),
];

/// Score outside the specialist roles.
const DEFAULT_SCORE: f64 = 0.1;

/// Bonus per description word that exactly matches a capability tag.
const CAPABILITY_BONUS: f64 = 0.1;

/// Suitability of `worker` for `task`, in `[0.0, 1.0]`.
pub fn score(worker: &Worker, task: &Task) -> f64 {
    let description = task.description.to_lowercase();

    let base = ROLE_AFFINITY
        .iter()
        .find(|(role, _, _, _)| *role == worker.role)
        .map(|(_, keywords, on_match, fallback)| {
            if keywords.iter().any(|kw| description.contains(kw)) {
                *on_match
            } else {
                *fallback
            }
        })
        .unwrap_or(DEFAULT_SCORE);

    let capability_words: Vec<&str> = worker
        .capabilities
        .iter()
        .flat_map(|c| c.split_whitespace())
        .collect();
    let overlap = description
        .split_whitespace()
        .filter(|word| capability_words.contains(word))
        .count();

    (base + CAPABILITY_BONUS * overlap as f64).min(1.0)
}

/// Pick the best-scoring idle worker.
///
/// Ties go to the earlier worker in iteration order, so selection is
/// stable for a pool walked in insertion order. Returns `None` when no
/// worker is idle.
pub fn find_best<'a, I>(workers: I, task: &Task) -> Option<(WorkerId, f64)>
where
    I: IntoIterator<Item = &'a Worker>,
{
    let mut best: Option<(WorkerId, f64)> = None;
    let mut best_score = -1.0;
    for worker in workers {
        if !worker.is_available() {
            continue;
        }
        let s = score(worker, task);
        if s > best_score {
            best_score = s;
            best = Some((worker.id.clone(), s));
        }
    }
    best
}
