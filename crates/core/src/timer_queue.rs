//! Indexed binary min-heap of timers
//!
//! Every pushed timer gets a stable [`TimerHandle`]. The queue keeps a
//! handle -> heap slot table that is rewritten on every swap, so the due time
//! of a known timer can be changed in O(log n) without searching the heap.
//! Callers hold handles only for lookup; the queue owns the entries.

use std::time::Instant;

/// Stable handle to a timer inside a [`TimerQueue`]
///
/// Handles are recycled after the timer leaves the queue, so a handle must
/// be dropped by its owner as soon as the timer is popped or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(usize);

#[derive(Debug)]
struct Slot<K, P> {
    key: K,
    due: P,
    handle: TimerHandle,
}

/// Min-priority queue of `(due, key)` pairs with O(log n) priority updates
#[derive(Debug)]
pub struct TimerQueue<K, P = Instant> {
    /// Binary heap ordered by `due`, smallest first
    heap: Vec<Slot<K, P>>,
    /// Handle -> current heap index (None when the handle is free)
    positions: Vec<Option<usize>>,
    /// Handles available for reuse
    free: Vec<usize>,
}

impl<K, P: Ord + Copy> TimerQueue<K, P> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty queue with room for `capacity` timers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of queued timers
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queue `key` to fire at `due`
    pub fn push(&mut self, key: K, due: P) -> TimerHandle {
        let handle = match self.free.pop() {
            Some(handle) => handle,
            None => {
                self.positions.push(None);
                self.positions.len() - 1
            }
        };

        let index = self.heap.len();
        self.heap.push(Slot {
            key,
            due,
            handle: TimerHandle(handle),
        });
        self.positions[handle] = Some(index);
        self.sift_up(index);

        TimerHandle(handle)
    }

    /// Earliest timer without removing it
    pub fn peek(&self) -> Option<(&K, P)> {
        self.heap.first().map(|slot| (&slot.key, slot.due))
    }

    /// Remove and return the earliest timer
    pub fn pop(&mut self) -> Option<(K, P)> {
        self.remove_at(0)
    }

    /// Current due time of `handle`, if it is still queued
    pub fn due(&self, handle: TimerHandle) -> Option<P> {
        let index = self.position(handle)?;
        Some(self.heap[index].due)
    }

    /// Move `handle` to a new due time
    ///
    /// Returns false if the handle is not queued.
    pub fn update(&mut self, handle: TimerHandle, due: P) -> bool {
        let Some(index) = self.position(handle) else {
            return false;
        };

        let previous = std::mem::replace(&mut self.heap[index].due, due);
        if due < previous {
            self.sift_up(index);
        } else {
            self.sift_down(index);
        }
        true
    }

    /// Remove `handle` wherever it sits in the heap
    pub fn remove(&mut self, handle: TimerHandle) -> Option<(K, P)> {
        let index = self.position(handle)?;
        self.remove_at(index)
    }

    /// Drop every timer and release all handles
    pub fn clear(&mut self) {
        self.heap.clear();
        self.positions.clear();
        self.free.clear();
    }

    fn position(&self, handle: TimerHandle) -> Option<usize> {
        self.positions.get(handle.0).copied().flatten()
    }

    fn remove_at(&mut self, index: usize) -> Option<(K, P)> {
        if index >= self.heap.len() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap(index, last);
        let slot = self.heap.pop()?;
        self.positions[slot.handle.0] = None;
        self.free.push(slot.handle.0);

        if index < self.heap.len() {
            // The element moved into `index` may belong above or below it
            self.sift_down(index);
            self.sift_up(index);
        }

        Some((slot.key, slot.due))
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.positions[self.heap[a].handle.0] = Some(a);
        self.positions[self.heap[b].handle.0] = Some(b);
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].due >= self.heap[parent].due {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let mut smallest = left;
            if right < len && self.heap[right].due < self.heap[left].due {
                smallest = right;
            }

            if self.heap[smallest].due >= self.heap[index].due {
                break;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<K, P: Ord + Copy> Default for TimerQueue<K, P> {
    fn default() -> Self {
        Self::new()
    }
}
