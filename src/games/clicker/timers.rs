//! Deterministic task scheduler driven by game time.
//!
//! Timed effects never touch the browser's `setTimeout`/`setInterval`.
//! Instead they are queued here with a [`TaskId`] handle and fired by
//! [`Scheduler::pop_due`] as the fixed-step clock advances the virtual
//! millisecond counter. Every handle can be cancelled, which is how the
//! generator guarantees a single recurring tick.

/// Handle to a scheduled task. Stays valid for repeating tasks across
/// re-arms; becomes stale once a one-shot task fires or any task is cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Clone, Debug)]
struct Entry<T> {
    id: TaskId,
    due_ms: u64,
    /// `Some(period)` for repeating tasks.
    period_ms: Option<u64>,
    /// Scheduling order, breaks ties between tasks due at the same instant.
    seq: u64,
    task: T,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            next_seq: 0,
            entries: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of armed tasks.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Run `task` once, `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: u64, task: T) -> TaskId {
        self.insert(delay_ms, None, task)
    }

    /// Run `task` every `period_ms`, first firing one period from now.
    pub fn schedule_every(&mut self, period_ms: u64, task: T) -> TaskId {
        // A zero period would never let pop_due make progress.
        let period_ms = period_ms.max(1);
        self.insert(period_ms, Some(period_ms), task)
    }

    fn insert(&mut self, delay_ms: u64, period_ms: Option<u64>, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            id,
            due_ms: self.now_ms + delay_ms,
            period_ms,
            seq,
            task,
        });
        id
    }

    /// Cancel a task. Returns false if it was not armed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Milliseconds until `id` fires next, if armed.
    pub fn remaining_ms(&self, id: TaskId) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.due_ms.saturating_sub(self.now_ms))
    }

    /// Drop every task.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pop the earliest task due at or before `deadline_ms`.
    ///
    /// The clock moves to the task's due time before it is returned, so work
    /// scheduled while handling it is relative to the firing instant.
    /// Repeating tasks are re-armed one period later under the same id.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<(TaskId, T)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= deadline_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))
            .map(|(i, _)| i)?;

        let due = self.entries[idx].due_ms;
        if due > self.now_ms {
            self.now_ms = due;
        }

        match self.entries[idx].period_ms {
            Some(period) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let entry = &mut self.entries[idx];
                entry.due_ms += period;
                entry.seq = seq;
                Some((entry.id, entry.task.clone()))
            }
            None => {
                let entry = self.entries.remove(idx);
                Some((entry.id, entry.task))
            }
        }
    }

    /// Move the clock forward to `deadline_ms` (never backwards).
    pub fn advance_to(&mut self, deadline_ms: u64) {
        if deadline_ms > self.now_ms {
            self.now_ms = deadline_ms;
        }
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
