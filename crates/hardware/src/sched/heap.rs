//! D-ary min-heap of timed actions.
//!
//! Entries are ordered by `(time, seq)`, where `seq` is a monotonically increasing insertion
//! counter. Two actions due at the same time therefore pop in the order they were pushed,
//! and a uniform shift of every time (see [`AgendaHeap::rebase`]) cannot reorder anything.

#[derive(Debug)]
struct Entry<A> {
    time: u64,
    seq: u64,
    action: A,
}

impl<A> Entry<A> {
    #[inline]
    fn precedes(&self, other: &Self) -> bool {
        (self.time, self.seq) < (other.time, other.seq)
    }
}

/// Priority queue of actions keyed by heap-local time.
#[derive(Debug)]
pub struct AgendaHeap<A> {
    entries: Vec<Entry<A>>,
    arity: usize,
    next_seq: u64,
}

impl<A> AgendaHeap<A> {
    /// Creates an empty heap; `arity` is clamped to at least 2.
    pub fn new(arity: usize) -> Self {
        Self {
            entries: Vec::new(),
            arity: arity.max(2),
            next_seq: 0,
        }
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time of the earliest action.
    pub fn peek_time(&self) -> Option<u64> {
        self.entries.first().map(|e| e.time)
    }

    /// Queues `action` at local `time`.
    pub fn push(&mut self, time: u64, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { time, seq, action });
        self.sift_up(self.entries.len() - 1);
    }

    /// Removes the earliest action.
    pub fn pop(&mut self) -> Option<(u64, A)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let entry = self.entries.pop()?;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((entry.time, entry.action))
    }

    /// Subtracts `delta` from every queued time.
    ///
    /// Callers guarantee every time is at least `delta`. Relative order is unchanged, so
    /// no re-heapify is needed.
    pub fn rebase(&mut self, delta: u64) {
        for entry in &mut self.entries {
            entry.time -= delta;
        }
    }

    /// Visits every queued action mutably, in no particular order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut A)) {
        for entry in &mut self.entries {
            f(&mut entry.action);
        }
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / self.arity;
            if !self.entries[idx].precedes(&self.entries[parent]) {
                break;
            }
            self.entries.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.entries.len();
        loop {
            let first_child = idx * self.arity + 1;
            if first_child >= len {
                break;
            }
            let last_child = (first_child + self.arity).min(len);
            let mut best = first_child;
            for child in first_child + 1..last_child {
                if self.entries[child].precedes(&self.entries[best]) {
                    best = child;
                }
            }
            if !self.entries[best].precedes(&self.entries[idx]) {
                break;
            }
            self.entries.swap(idx, best);
            idx = best;
        }
    }
}
