// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The queue control block: four monotone counters that partition the
//! slot space into free / acquired / published / dequeued.
//!
//! Each counter only ever advances, and the partial order
//! `rel_head ≤ deq_head ≤ enq_tail ≤ acq_tail` always holds. Slot index
//! and generation are recovered from a counter by `% capacity` and
//! `/ capacity` — the latter is the wrap-count.
//!
//! Loads use `Acquire` and advances use `AcqRel` so that a consumer that
//! observes an advanced `enq_tail` also observes the producer's writes
//! into the published blocks (and symmetrically for `rel_head`). Each
//! side of the protocol is single-threaded, so check-then-advance on the
//! owned counters is race-free.

use crate::QueueError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the four slot-state counts. Always sums to the capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueCounts {
    /// Slots available to the producer.
    pub free: usize,
    /// Slots claimed by the producer, not yet published.
    pub acquired: usize,
    /// Slots published to the consumer, not yet claimed.
    pub published: usize,
    /// Slots claimed by the consumer, not yet returned.
    pub dequeued: usize,
}

impl QueueCounts {
    /// Returns the total across all four states.
    pub fn total(&self) -> usize {
        self.free + self.acquired + self.published + self.dequeued
    }
}

/// The shared control block of one circular queue.
#[derive(Debug)]
pub(crate) struct ControlBlock {
    capacity: u64,
    /// Producer claim pointer (acquire advances this).
    acq_tail: AtomicU64,
    /// Producer publish pointer (enqueue advances this).
    enq_tail: AtomicU64,
    /// Consumer claim pointer (dequeue advances this).
    deq_head: AtomicU64,
    /// Consumer return pointer (release advances this).
    rel_head: AtomicU64,
}

impl ControlBlock {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity as u64,
            acq_tail: AtomicU64::new(0),
            enq_tail: AtomicU64::new(0),
            deq_head: AtomicU64::new(0),
            rel_head: AtomicU64::new(0),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity as usize
    }

    // ── State counts ───────────────────────────────────────────

    pub(crate) fn counts(&self) -> QueueCounts {
        // Read in release-to-acquire order so that each count is
        // non-negative even if the other side advances between loads.
        let rel = self.rel_head.load(Ordering::Acquire);
        let deq = self.deq_head.load(Ordering::Acquire);
        let enq = self.enq_tail.load(Ordering::Acquire);
        let acq = self.acq_tail.load(Ordering::Acquire);

        let in_flight = acq - rel;
        QueueCounts {
            free: (self.capacity - in_flight) as usize,
            acquired: (acq - enq) as usize,
            published: (enq - deq) as usize,
            dequeued: (deq - rel) as usize,
        }
    }

    pub(crate) fn free(&self) -> usize {
        self.counts().free
    }

    pub(crate) fn acquired(&self) -> usize {
        self.counts().acquired
    }

    pub(crate) fn published(&self) -> usize {
        self.counts().published
    }

    pub(crate) fn dequeued(&self) -> usize {
        self.counts().dequeued
    }

    /// Completed traversals of the index space (generation counter).
    pub(crate) fn wrapcount(&self) -> usize {
        (self.rel_head.load(Ordering::Acquire) / self.capacity) as usize
    }

    /// Index of the oldest acquired-but-unpublished slot.
    pub(crate) fn acquired_buf_idx(&self) -> usize {
        (self.enq_tail.load(Ordering::Acquire) % self.capacity) as usize
    }

    /// Index of the oldest dequeued-but-unreleased slot.
    pub(crate) fn dequeued_buf_idx(&self) -> usize {
        (self.rel_head.load(Ordering::Acquire) % self.capacity) as usize
    }

    // ── Phase advances ─────────────────────────────────────────
    //
    // Each advance checks its own phase's availability first and returns
    // the index of the first slot it claimed (for acquire/dequeue).

    pub(crate) fn acquire(&self, n: usize) -> Result<usize, QueueError> {
        let available = self.free();
        if n > available {
            return Err(QueueError::InsufficientSlots {
                phase: "acquire",
                requested: n,
                available,
            });
        }
        let prev = self.acq_tail.fetch_add(n as u64, Ordering::AcqRel);
        Ok((prev % self.capacity) as usize)
    }

    pub(crate) fn enqueue(&self, n: usize) -> Result<(), QueueError> {
        let available = self.acquired();
        if n > available {
            return Err(QueueError::InsufficientSlots {
                phase: "enqueue",
                requested: n,
                available,
            });
        }
        self.enq_tail.fetch_add(n as u64, Ordering::AcqRel);
        Ok(())
    }

    pub(crate) fn dequeue(&self, n: usize) -> Result<usize, QueueError> {
        let available = self.published();
        if n > available {
            return Err(QueueError::InsufficientSlots {
                phase: "dequeue",
                requested: n,
                available,
            });
        }
        let prev = self.deq_head.fetch_add(n as u64, Ordering::AcqRel);
        Ok((prev % self.capacity) as usize)
    }

    pub(crate) fn release(&self, n: usize) -> Result<(), QueueError> {
        let available = self.dequeued();
        if n > available {
            return Err(QueueError::InsufficientSlots {
                phase: "release",
                requested: n,
                available,
            });
        }
        self.rel_head.fetch_add(n as u64, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_conserved(ctrl: &ControlBlock) {
        assert_eq!(ctrl.counts().total(), ctrl.capacity());
    }

    #[test]
    fn test_initial_state() {
        let c = ControlBlock::new(4);
        let counts = c.counts();
        assert_eq!(counts.free, 4);
        assert_eq!(counts.acquired, 0);
        assert_eq!(counts.published, 0);
        assert_eq!(counts.dequeued, 0);
        assert_conserved(&c);
    }

    #[test]
    fn test_full_cycle() {
        let c = ControlBlock::new(3);

        let idx = c.acquire(1).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(c.acquired(), 1);
        assert_conserved(&c);

        c.enqueue(1).unwrap();
        assert_eq!(c.published(), 1);
        assert_conserved(&c);

        let idx = c.dequeue(1).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(c.dequeued(), 1);
        assert_conserved(&c);

        c.release(1).unwrap();
        assert_eq!(c.free(), 3);
        assert_conserved(&c);
    }

    #[test]
    fn test_phase_guards() {
        let c = ControlBlock::new(2);

        // Nothing acquired yet: enqueue rejected.
        assert!(matches!(
            c.enqueue(1),
            Err(QueueError::InsufficientSlots {
                phase: "enqueue",
                ..
            })
        ));
        // Nothing published: dequeue rejected.
        assert!(c.dequeue(1).is_err());
        // Nothing dequeued: release rejected.
        assert!(c.release(1).is_err());
        assert_conserved(&c);
    }

    #[test]
    fn test_acquire_exhaustion() {
        let c = ControlBlock::new(2);
        c.acquire(2).unwrap();
        let err = c.acquire(1).unwrap_err();
        assert_eq!(
            err,
            QueueError::InsufficientSlots {
                phase: "acquire",
                requested: 1,
                available: 0,
            }
        );
        assert_conserved(&c);
    }

    #[test]
    fn test_wrapcount_increments_per_traversal() {
        let c = ControlBlock::new(2);
        assert_eq!(c.wrapcount(), 0);

        for round in 0..3 {
            for _ in 0..2 {
                c.acquire(1).unwrap();
                c.enqueue(1).unwrap();
                c.dequeue(1).unwrap();
                c.release(1).unwrap();
            }
            assert_eq!(c.wrapcount(), round + 1);
        }
    }

    #[test]
    fn test_slot_indices_wrap() {
        let c = ControlBlock::new(2);
        assert_eq!(c.acquire(1).unwrap(), 0);
        c.enqueue(1).unwrap();
        assert_eq!(c.acquire(1).unwrap(), 1);
        c.enqueue(1).unwrap();
        c.dequeue(2).unwrap();
        c.release(2).unwrap();
        // Same index, next generation.
        assert_eq!(c.acquire(1).unwrap(), 0);
        assert_eq!(c.wrapcount(), 1);
    }

    #[test]
    fn test_bulk_advance() {
        let c = ControlBlock::new(5);
        let first = c.acquire(3).unwrap();
        assert_eq!(first, 0);
        c.enqueue(3).unwrap();
        let first = c.dequeue(2).unwrap();
        assert_eq!(first, 0);
        assert_eq!(c.published(), 1);
        assert_eq!(c.dequeued(), 2);
        assert_conserved(&c);
    }
}
