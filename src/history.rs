/*
 *  history.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bounded, thread-safe history of the most recent sweep rows
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
//! Fixed-capacity FIFO of sweep rows shared between one producer and any
//! number of readers.
//!
//! Eviction and enqueue happen in a single write-locked section, so a
//! concurrent [`HistoryBuffer::snapshot`] sees either the whole push or none
//! of it. Change notification is delivered after the lock is released.

use std::sync::Arc;

use log::trace;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::watch;

use crate::sweep::Row;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history capacity must be greater than zero")]
    ZeroCapacity,
}

/// Callback fired after a push changed the buffer.
pub type PushObserver = Arc<dyn Fn(&Row) + Send + Sync>;

/// Ring storage: `len` rows starting at `head`, oldest first.
struct Ring {
    slots: Vec<Option<Row>>,
    head: usize,
    len: usize,
    generation: u64,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            generation: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn newest(&self) -> Option<&Row> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.len - 1) % self.capacity();
        self.slots[idx].as_ref()
    }

    /// Enqueue, evicting exactly one row when full. Returns the evicted row.
    fn push(&mut self, row: Row) -> Option<Row> {
        let capacity = self.capacity();
        if self.len == capacity {
            let evicted = self.slots[self.head].replace(row);
            self.head = (self.head + 1) % capacity;
            evicted
        } else {
            let idx = (self.head + self.len) % capacity;
            self.slots[idx] = Some(row);
            self.len += 1;
            None
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Row> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % capacity].as_ref())
    }

    fn clear(&mut self) -> Vec<Row> {
        let drained = self.slots.iter_mut().filter_map(Option::take).collect();
        self.head = 0;
        self.len = 0;
        drained
    }
}

/// Bounded history of the most recent rows.
pub struct HistoryBuffer {
    ring: RwLock<Ring>,
    capacity: usize,
    changed_tx: watch::Sender<u64>,
    observers: RwLock<Vec<PushObserver>>,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }
        Ok(Self {
            ring: RwLock::new(Ring::new(capacity)),
            capacity,
            changed_tx: watch::Sender::new(0),
            observers: RwLock::new(Vec::new()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ring.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of visible mutations so far.
    pub fn generation(&self) -> u64 {
        self.ring.read().generation
    }

    /// Append `row` as the newest entry.
    ///
    /// Empty rows and a repeat of the current newest row are ignored. Returns
    /// true when the buffer changed (and observers were notified).
    pub fn push(&self, row: Row) -> bool {
        if row.is_empty() {
            return false;
        }

        let (generation, evicted) = {
            let mut ring = self.ring.write();
            if ring.newest().is_some_and(|newest| *newest == row) {
                return false;
            }
            let evicted = ring.push(row.clone());
            ring.generation += 1;
            (ring.generation, evicted)
        };
        // the evicted row's storage is released outside the lock
        if let Some(old) = evicted {
            trace!("history: evicted row of {} samples", old.len());
        }

        self.notify(generation, Some(&row));
        true
    }

    /// Oldest-first copy of every held row.
    pub fn snapshot(&self) -> Vec<Row> {
        let ring = self.ring.read();
        ring.iter().cloned().collect()
    }

    /// The most recent `count` rows, oldest first.
    pub fn snapshot_latest(&self, count: usize) -> Vec<Row> {
        let ring = self.ring.read();
        let skip = ring.len.saturating_sub(count);
        ring.iter().skip(skip).cloned().collect()
    }

    /// Most recently pushed row.
    pub fn latest(&self) -> Option<Row> {
        self.ring.read().newest().cloned()
    }

    /// Drop all rows; returns true (and notifies) if anything was removed.
    pub fn clear(&self) -> bool {
        let (generation, drained) = {
            let mut ring = self.ring.write();
            let drained = ring.clear();
            if drained.is_empty() {
                return false;
            }
            ring.generation += 1;
            (ring.generation, drained)
        };
        trace!("history: cleared {} rows", drained.len());
        drop(drained);
        self.notify(generation, None);
        true
    }

    /// Receiver whose value is the buffer generation; changes on every
    /// successful push or clear.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed_tx.subscribe()
    }

    /// Register a callback run after each successful push.
    ///
    /// Callbacks run on the pushing thread and must not block.
    pub fn on_push<F>(&self, observer: F)
    where
        F: Fn(&Row) + Send + Sync + 'static,
    {
        self.observers.write().push(Arc::new(observer));
    }

    fn notify(&self, generation: u64, row: Option<&Row>) {
        // pushes from several threads may finish out of order; keep it monotonic
        self.changed_tx.send_if_modified(|current| {
            if generation > *current {
                *current = generation;
                true
            } else {
                false
            }
        });

        if let Some(row) = row {
            let observers: Vec<PushObserver> = self.observers.read().clone();
            for observer in observers {
                observer(row);
            }
        }
    }
}

impl std::fmt::Debug for HistoryBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}
