//! Deferred tasks — one-shot items that come due after a number of timer ticks.
//!
//! The engine never blocks inside a host callback; anything that happens
//! "later" (a snapshot-name restore, for instance) is queued here and
//! drained by the periodic tick.

/// FIFO of pending items with per-item tick countdowns.
///
/// Delays of zero and one both come due on the next tick; same-tick items
/// drain in insertion order.
#[derive(Debug)]
pub struct TickQueue<T> {
    entries: Vec<(u32, T)>,
}

impl<T> TickQueue<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, delay_ticks: u32, item: T) {
        self.entries.push((delay_ticks, item));
    }

    /// Advance one tick and return every item that came due.
    pub fn tick(&mut self) -> Vec<T> {
        let mut due = Vec::new();
        let mut keep = Vec::with_capacity(self.entries.len());
        for (ticks, item) in self.entries.drain(..) {
            if ticks <= 1 {
                due.push(item);
            } else {
                keep.push((ticks - 1, item));
            }
        }
        self.entries = keep;
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for TickQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
