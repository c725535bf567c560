//! Registry of triggered source paths
//!
//! Holds at most one record per source path. Each live record owns exactly
//! one timer in the queue; the record keeps the timer's handle so reschedules
//! stay O(log n). Mirror destinations of live records are counted so a write
//! to one of them can be recognized as the mirror's own.

use crate::timer_queue::{TimerHandle, TimerQueue};
use ahash::AHashMap;
use std::time::Instant;

/// What a record does when its Pending timer fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Reload the config file
    Config,
    /// Copy the source to this absolute destination path
    Mirror(String),
}

/// Phase of a live record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for writes to go quiet before acting
    Pending,
    /// Action ran; cooling down before the record is dropped
    Settling,
}

/// Outcome of registering a modification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// New record, Pending
    Created,
    /// Existing record pushed back to Pending with a fresh due time
    Restarted,
    /// The path or its destination is already tracked; most likely our own copy
    Feedback,
}

#[derive(Debug)]
struct Record {
    target: Target,
    phase: Phase,
    handle: TimerHandle,
}

/// A record whose timer has elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired {
    pub source: String,
    pub target: Target,
    pub phase: Phase,
}

/// Source path -> record map plus the timer queue driving it
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    records: AHashMap<String, Record>,
    queue: TimerQueue<String>,
    /// Destination path -> number of live records mirroring onto it
    destinations: AHashMap<String, usize>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.records.contains_key(source)
    }

    pub fn phase(&self, source: &str) -> Option<Phase> {
        self.records.get(source).map(|record| record.phase)
    }

    pub fn target(&self, source: &str) -> Option<&Target> {
        self.records.get(source).map(|record| &record.target)
    }

    /// Due time of the record for `source`
    pub fn due(&self, source: &str) -> Option<Instant> {
        let record = self.records.get(source)?;
        self.queue.due(record.handle)
    }

    /// Register a modification of `source`, due at `due`
    ///
    /// An existing record (Pending or Settling) goes back to Pending with the
    /// new due time. A new record is refused when `source` is the destination
    /// of a live record, or when its own destination is a tracked source.
    /// Both are what the mirror's own writes look like.
    pub fn register(&mut self, source: String, target: Target, due: Instant) -> Registration {
        if let Some(record) = self.records.get_mut(&source) {
            record.phase = Phase::Pending;
            self.queue.update(record.handle, due);
            return Registration::Restarted;
        }

        if self.destinations.contains_key(&source) {
            return Registration::Feedback;
        }

        if let Target::Mirror(destination) = &target {
            if self.records.contains_key(destination) {
                return Registration::Feedback;
            }
            *self.destinations.entry(destination.clone()).or_default() += 1;
        }

        let handle = self.queue.push(source.clone(), due);
        self.records.insert(
            source,
            Record {
                target,
                phase: Phase::Pending,
                handle,
            },
        );
        Registration::Created
    }

    /// Earliest due time across all records
    pub fn next_due(&self) -> Option<Instant> {
        self.queue.peek().map(|(_, due)| due)
    }

    /// The earliest record if its due time is at or before `now`
    pub fn next_expired(&self, now: Instant) -> Option<Expired> {
        let (source, due) = self.queue.peek()?;
        if due > now {
            return None;
        }

        let record = self.records.get(source)?;
        Some(Expired {
            source: source.clone(),
            target: record.target.clone(),
            phase: record.phase,
        })
    }

    /// Move `source` to Settling, due at `due`
    pub fn settle(&mut self, source: &str, due: Instant) -> bool {
        let Some(record) = self.records.get_mut(source) else {
            return false;
        };
        record.phase = Phase::Settling;
        self.queue.update(record.handle, due)
    }

    /// Drop the record for `source` and its timer
    pub fn remove(&mut self, source: &str) -> Option<Target> {
        let record = self.records.remove(source)?;
        self.queue.remove(record.handle);
        if let Target::Mirror(destination) = &record.target {
            self.release_destination(destination);
        }
        Some(record.target)
    }

    /// Drop every record, returning how many were live
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        self.queue.clear();
        self.destinations.clear();
        count
    }

    fn release_destination(&mut self, destination: &str) {
        if let Some(count) = self.destinations.get_mut(destination) {
            *count -= 1;
            if *count == 0 {
                self.destinations.remove(destination);
            }
        }
    }
}
