//=========================================================================
// Scheduler
//=========================================================================
//
// Scheduled-task queue replacing suspended "wait N seconds, then act"
// control flow. Each task is a (deadline, callback) record polled once
// per tick by the engine.
//
// Architecture:
//   schedule_in(now, delay, task) → BinaryHeap<Reverse<(deadline, seq)>>
//                                         ↓
//   Engine tick ─→ take_due(now) → run each task with &mut GlobalContext
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

//=== Internal Dependencies ===============================================

use crate::core::globals::GlobalContext;

//=== Public API ==========================================================

/// Deferred work run with full access to the shared context.
pub type ScheduledTask = Box<dyn FnOnce(&mut GlobalContext) + Send>;

/// Identifier returned by the scheduler, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

//=== Deadline Ordering ===================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Deadline {
    at: f64,
    id: TaskId,
}

impl Eq for Deadline {}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Deadline {
    // Earlier deadline first; equal deadlines in scheduling order
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.total_cmp(&other.at).then(self.id.cmp(&other.id))
    }
}

//=== Scheduler ===========================================================

/// Queue of tasks waiting for a deadline expressed in elapsed seconds.
pub struct Scheduler {
    deadlines: BinaryHeap<Reverse<Deadline>>,
    tasks: HashMap<TaskId, ScheduledTask>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            deadlines: BinaryHeap::new(),
            tasks: HashMap::new(),
            next_id: 1,
        }
    }

    //--- Scheduling -------------------------------------------------------

    /// Schedules `task` to run on the first tick where elapsed ≥ `deadline`.
    pub fn schedule_at<F>(&mut self, deadline: f64, task: F) -> TaskId
    where
        F: FnOnce(&mut GlobalContext) + Send + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        self.deadlines.push(Reverse(Deadline { at: deadline, id }));
        self.tasks.insert(id, Box::new(task));
        id
    }

    /// Schedules `task` to run `delay` seconds after `now`.
    pub fn schedule_in<F>(&mut self, now: f64, delay: f32, task: F) -> TaskId
    where
        F: FnOnce(&mut GlobalContext) + Send + 'static,
    {
        self.schedule_at(now + f64::from(delay.max(0.0)), task)
    }

    /// Cancels a pending task. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if self.tasks.remove(&id).is_none() {
            return false;
        }

        // Heap entries of cancelled tasks are skipped in take_due until
        // they outnumber the live ones
        if self.deadlines.len() > 2 * self.tasks.len() {
            let tasks = &self.tasks;
            self.deadlines.retain(|Reverse(d)| tasks.contains_key(&d.id));
        }
        true
    }

    //--- Polling ----------------------------------------------------------

    /// Removes and returns every task whose deadline is ≤ `now`, earliest
    /// first.
    pub fn take_due(&mut self, now: f64) -> Vec<ScheduledTask> {
        let mut due = Vec::new();

        while let Some(Reverse(next)) = self.deadlines.peek().copied() {
            if next.at > now {
                break;
            }
            self.deadlines.pop();

            if let Some(task) = self.tasks.remove(&next.id) {
                due.push(task);
            }
        }

        due
    }

    //--- Queries ----------------------------------------------------------

    /// Earliest deadline among pending (not cancelled) tasks.
    pub fn next_deadline(&self) -> Option<f64> {
        self.deadlines
            .iter()
            .filter(|Reverse(d)| self.tasks.contains_key(&d.id))
            .map(|Reverse(d)| d.at)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
