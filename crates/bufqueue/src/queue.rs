// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The buffer queue: 1–5 parallel sub-buffers over one control block.
//!
//! The whole-queue operations treat all sub-buffers as one unit: a slot
//! index claimed through [`BufQueue::acquire`] refers to block `idx` of
//! *every* sub-buffer. The `_subq` variants run the same protocol on one
//! sub-buffer alone, for cases where sub-buffers drain at different rates.

use crate::ctrl::ControlBlock;
use crate::{BlockDimensions, BufBlock, QueueCounts, QueueError};

/// Maximum number of parallel sub-buffers sharing one control block.
pub const MAX_SUB_BUFFERS: usize = 5;

/// A circular multi-sub-buffer queue.
///
/// # Example
/// ```
/// use bufqueue::{BufBlock, BufQueue};
///
/// // 2 slots, one sub-buffer of 256-byte blocks.
/// let q = BufQueue::new(0, 2, vec![BufBlock::new(0, 256, 64, 4)]).unwrap();
///
/// // Producer side.
/// assert!(q.can_acquire_n(1));
/// let slot = q.acquire().unwrap();
/// q.enqueue().unwrap();
///
/// // Consumer side.
/// assert!(q.can_dequeue_n(1));
/// assert_eq!(q.dequeue().unwrap(), slot);
/// q.release().unwrap();
/// assert!(q.is_empty());
/// ```
#[derive(Debug)]
pub struct BufQueue {
    id: u32,
    blocks: Vec<BufBlock>,
    /// Whole-queue protocol state.
    ctrl: ControlBlock,
    /// Independent per-sub-buffer protocol state.
    subq: Vec<ControlBlock>,
}

impl BufQueue {
    /// Creates a queue of `capacity` slots over the given sub-buffers.
    ///
    /// Between 1 and [`MAX_SUB_BUFFERS`] sub-buffers are supported.
    pub fn new(id: u32, capacity: usize, blocks: Vec<BufBlock>) -> Result<Self, QueueError> {
        if blocks.is_empty() {
            return Err(QueueError::ZeroBlocks);
        }
        if blocks.len() > MAX_SUB_BUFFERS {
            return Err(QueueError::TooManyBlocks(blocks.len()));
        }
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        let subq = (0..blocks.len()).map(|_| ControlBlock::new(capacity)).collect();
        Ok(Self {
            id,
            blocks,
            ctrl: ControlBlock::new(capacity),
            subq,
        })
    }

    /// Explicit creation: sub-buffers are laid out consecutively from
    /// `start_offset`, each spec giving `(size, width, height)` of one
    /// block. Sub-buffer `k` starts where sub-buffer `k-1`'s `capacity`
    /// blocks end.
    pub fn explicit(
        id: u32,
        start_offset: u32,
        capacity: usize,
        specs: &[(u32, u32, u32)],
    ) -> Result<Self, QueueError> {
        let mut offset = start_offset;
        let mut blocks = Vec::with_capacity(specs.len());
        for &(size, width, height) in specs {
            blocks.push(BufBlock::new(offset, size, width, height));
            offset += size * capacity as u32;
        }
        Self::new(id, capacity, blocks)
    }

    /// Explicit creation of a single-sub-buffer queue with a line stride.
    pub fn explicit_with_stride(
        id: u32,
        start_offset: u32,
        capacity: usize,
        size: u32,
        width: u32,
        height: u32,
        stride: u32,
    ) -> Result<Self, QueueError> {
        Self::new(
            id,
            capacity,
            vec![BufBlock::with_stride(start_offset, size, width, height, stride)],
        )
    }

    /// Template creation: block geometry derived from buffer/fragment
    /// dimensions via [`calc_block_dimensions`](crate::calc_block_dimensions).
    pub fn from_dimensions(
        id: u32,
        start_offset: u32,
        capacity: usize,
        dims: BlockDimensions,
        bits_per_element: u32,
    ) -> Result<Self, QueueError> {
        Self::new(id, capacity, vec![dims.to_block(start_offset, bits_per_element)])
    }

    // ── Whole-queue protocol ───────────────────────────────────

    /// Returns `true` if the producer can claim `n` slots.
    pub fn can_acquire_n(&self, n: usize) -> bool {
        self.ctrl.free() >= n
    }

    /// Claims the next free slot for the producer; returns its index.
    pub fn acquire(&self) -> Result<usize, QueueError> {
        self.ctrl.acquire(1)
    }

    /// Claims the next `n` free slots; returns the first slot index.
    pub fn acquire_n(&self, n: usize) -> Result<usize, QueueError> {
        self.ctrl.acquire(n)
    }

    /// Publishes one previously acquired slot to the consumer.
    pub fn enqueue(&self) -> Result<(), QueueError> {
        self.ctrl.enqueue(1)
    }

    /// Publishes `n` previously acquired slots.
    pub fn enqueue_n(&self, n: usize) -> Result<(), QueueError> {
        self.ctrl.enqueue(n)
    }

    /// Returns `true` if the consumer can claim `n` published slots.
    pub fn can_dequeue_n(&self, n: usize) -> bool {
        self.ctrl.published() >= n
    }

    /// Claims the next published slot for the consumer; returns its index.
    pub fn dequeue(&self) -> Result<usize, QueueError> {
        self.ctrl.dequeue(1)
    }

    /// Claims the next `n` published slots; returns the first slot index.
    pub fn dequeue_n(&self, n: usize) -> Result<usize, QueueError> {
        self.ctrl.dequeue(n)
    }

    /// Returns one consumed slot to the free pool.
    pub fn release(&self) -> Result<(), QueueError> {
        self.ctrl.release(1)
    }

    /// Returns `n` consumed slots to the free pool.
    pub fn release_n(&self, n: usize) -> Result<(), QueueError> {
        self.ctrl.release(n)
    }

    // ── Per-sub-buffer protocol ────────────────────────────────

    /// `can_acquire_n` on sub-buffer `idx` alone.
    pub fn can_acquire_n_subq(&self, n: usize, idx: usize) -> bool {
        self.subq(idx).map(|c| c.free() >= n).unwrap_or(false)
    }

    /// `acquire` on sub-buffer `idx` alone.
    pub fn acquire_subq(&self, idx: usize) -> Result<usize, QueueError> {
        self.subq(idx)?.acquire(1)
    }

    /// `acquire_n` on sub-buffer `idx` alone.
    pub fn acquire_n_subq(&self, n: usize, idx: usize) -> Result<usize, QueueError> {
        self.subq(idx)?.acquire(n)
    }

    /// `enqueue` on sub-buffer `idx` alone.
    pub fn enqueue_subq(&self, idx: usize) -> Result<(), QueueError> {
        self.subq(idx)?.enqueue(1)
    }

    /// `enqueue_n` on sub-buffer `idx` alone.
    pub fn enqueue_n_subq(&self, n: usize, idx: usize) -> Result<(), QueueError> {
        self.subq(idx)?.enqueue(n)
    }

    /// `can_dequeue_n` on sub-buffer `idx` alone.
    pub fn can_dequeue_n_subq(&self, n: usize, idx: usize) -> bool {
        self.subq(idx).map(|c| c.published() >= n).unwrap_or(false)
    }

    /// `dequeue` on sub-buffer `idx` alone.
    pub fn dequeue_subq(&self, idx: usize) -> Result<usize, QueueError> {
        self.subq(idx)?.dequeue(1)
    }

    /// `dequeue_n` on sub-buffer `idx` alone.
    pub fn dequeue_n_subq(&self, n: usize, idx: usize) -> Result<usize, QueueError> {
        self.subq(idx)?.dequeue(n)
    }

    /// `release` on sub-buffer `idx` alone.
    pub fn release_subq(&self, idx: usize) -> Result<(), QueueError> {
        self.subq(idx)?.release(1)
    }

    /// `release_n` on sub-buffer `idx` alone.
    pub fn release_n_subq(&self, n: usize, idx: usize) -> Result<(), QueueError> {
        self.subq(idx)?.release(n)
    }

    /// `is_empty` on sub-buffer `idx` alone.
    pub fn is_empty_subq(&self, idx: usize) -> bool {
        self.subq(idx)
            .map(|c| c.free() == c.capacity())
            .unwrap_or(false)
    }

    /// `is_full` on sub-buffer `idx` alone.
    pub fn is_full_subq(&self, idx: usize) -> bool {
        self.subq(idx).map(|c| c.free() == 0).unwrap_or(false)
    }

    /// Oldest acquired-but-unpublished slot index of sub-buffer `idx`.
    pub fn acquired_buf_idx_subq(&self, idx: usize) -> Result<usize, QueueError> {
        Ok(self.subq(idx)?.acquired_buf_idx())
    }

    /// `true` if sub-buffer `idx` has no acquired-but-unpublished slots.
    pub fn num_acquired_is_zero_subq(&self, idx: usize) -> bool {
        self.subq(idx).map(|c| c.acquired() == 0).unwrap_or(true)
    }

    /// `true` if sub-buffer `idx` has no dequeued-but-unreleased slots.
    pub fn num_dequeued_is_zero_subq(&self, idx: usize) -> bool {
        self.subq(idx).map(|c| c.dequeued() == 0).unwrap_or(true)
    }

    // ── Introspection (pure reads) ─────────────────────────────

    /// Returns the queue id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns `true` if every slot is free.
    pub fn is_empty(&self) -> bool {
        self.ctrl.free() == self.ctrl.capacity()
    }

    /// Returns `true` if no slot is free.
    pub fn is_full(&self) -> bool {
        self.ctrl.free() == 0
    }

    /// Completed traversals of the index space.
    pub fn wrapcount(&self) -> usize {
        self.ctrl.wrapcount()
    }

    /// The slot capacity of the queue.
    pub fn num_blocks(&self) -> usize {
        self.ctrl.capacity()
    }

    /// The number of parallel sub-buffers (1–5).
    pub fn num_sub_buffers(&self) -> usize {
        self.blocks.len()
    }

    /// Oldest acquired-but-unpublished slot index.
    pub fn acquired_buf_idx(&self) -> usize {
        self.ctrl.acquired_buf_idx()
    }

    /// Oldest dequeued-but-unreleased slot index.
    pub fn dequeued_buf_idx(&self) -> usize {
        self.ctrl.dequeued_buf_idx()
    }

    /// `true` if no slots are in the acquired state.
    pub fn num_acquired_is_zero(&self) -> bool {
        self.ctrl.acquired() == 0
    }

    /// `true` if no slots are in the dequeued state.
    pub fn num_dequeued_is_zero(&self) -> bool {
        self.ctrl.dequeued() == 0
    }

    /// Returns the geometry of sub-buffer `idx`.
    pub fn block(&self, idx: usize) -> Option<&BufBlock> {
        self.blocks.get(idx)
    }

    /// Block size in bytes of sub-buffer 0.
    pub fn block_size(&self) -> u32 {
        self.blocks[0].size
    }

    /// Block width of sub-buffer 0.
    pub fn block_width(&self) -> u32 {
        self.blocks[0].width
    }

    /// Block height of sub-buffer 0.
    pub fn block_height(&self) -> u32 {
        self.blocks[0].height
    }

    /// Snapshot of the whole-queue slot-state counts.
    pub fn counts(&self) -> QueueCounts {
        self.ctrl.counts()
    }

    /// Snapshot of sub-buffer `idx`'s slot-state counts.
    pub fn counts_subq(&self, idx: usize) -> Result<QueueCounts, QueueError> {
        Ok(self.subq(idx)?.counts())
    }

    fn subq(&self, idx: usize) -> Result<&ControlBlock, QueueError> {
        self.subq.get(idx).ok_or(QueueError::BadSubQueue {
            idx,
            count: self.subq.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_block_dimensions;

    fn queue(capacity: usize, subs: usize) -> BufQueue {
        let blocks = (0..subs)
            .map(|i| BufBlock::new(i as u32 * 0x1000, 256, 64, 4))
            .collect();
        BufQueue::new(7, capacity, blocks).unwrap()
    }

    #[test]
    fn test_construction_bounds() {
        assert_eq!(BufQueue::new(0, 2, vec![]).unwrap_err(), QueueError::ZeroBlocks);
        let six = (0..6).map(|_| BufBlock::new(0, 1, 1, 1)).collect();
        assert_eq!(
            BufQueue::new(0, 2, six).unwrap_err(),
            QueueError::TooManyBlocks(6)
        );
        assert_eq!(
            BufQueue::new(0, 0, vec![BufBlock::new(0, 1, 1, 1)]).unwrap_err(),
            QueueError::ZeroCapacity
        );
    }

    #[test]
    fn test_explicit_layout() {
        // Two sub-buffers, 3 slots: the second starts after 3 blocks of
        // the first.
        let q = BufQueue::explicit(1, 0x1000, 3, &[(0x100, 64, 4), (0x40, 32, 2)]).unwrap();
        assert_eq!(q.block(0).unwrap().offset, 0x1000);
        assert_eq!(q.block(1).unwrap().offset, 0x1000 + 3 * 0x100);
        assert_eq!(q.num_sub_buffers(), 2);
        assert_eq!(q.num_blocks(), 3);
    }

    #[test]
    fn test_explicit_with_stride() {
        let q = BufQueue::explicit_with_stride(2, 0, 2, 512, 100, 4, 128).unwrap();
        assert_eq!(q.block(0).unwrap().stride, 128);
        assert_eq!(q.num_sub_buffers(), 1);
    }

    #[test]
    fn test_template_creation() {
        let dims = calc_block_dimensions(640, 480, 640, 120);
        let q = BufQueue::from_dimensions(3, 0x2000, 4, dims, 8).unwrap();
        assert_eq!(q.block_width(), 640);
        assert_eq!(q.block_height(), 120);
        assert_eq!(q.block_size(), 640 * 120);
    }

    #[test]
    fn test_exhaustion_and_recovery() {
        // Exhaust a 2-slot queue, then recover one slot.
        let q = queue(2, 1);

        q.acquire().unwrap();
        q.enqueue().unwrap();
        q.acquire().unwrap();
        q.enqueue().unwrap();

        assert!(q.is_full());
        assert!(!q.can_acquire_n(1));
        assert!(q.acquire().is_err());

        q.dequeue().unwrap();
        q.release().unwrap();
        assert!(q.can_acquire_n(1));
        assert!(!q.is_full());
    }

    #[test]
    fn test_conservation_through_ops() {
        let q = queue(4, 1);
        let cap = q.num_blocks();

        assert_eq!(q.counts().total(), cap);
        q.acquire_n(3).unwrap();
        assert_eq!(q.counts().total(), cap);
        q.enqueue_n(2).unwrap();
        assert_eq!(q.counts().total(), cap);
        q.dequeue_n(2).unwrap();
        assert_eq!(q.counts().total(), cap);
        q.release_n(1).unwrap();
        assert_eq!(q.counts().total(), cap);

        let c = q.counts();
        assert_eq!((c.free, c.acquired, c.published, c.dequeued), (2, 1, 0, 1));
    }

    #[test]
    fn test_can_acquire_false_means_acquire_errors() {
        let q = queue(2, 1);
        q.acquire_n(2).unwrap();
        assert!(!q.can_acquire_n(1));
        assert!(q.acquire().is_err());
        // And the predicate stays consistent for bulk counts.
        assert!(q.can_acquire_n(0));
    }

    #[test]
    fn test_subq_independent_rates() {
        // Luma (sub 0) drains faster than chroma (sub 1).
        let q = queue(3, 2);

        q.acquire_subq(0).unwrap();
        q.enqueue_subq(0).unwrap();
        q.acquire_subq(1).unwrap();

        // Sub 0 has a published slot, sub 1 does not.
        assert!(q.can_dequeue_n_subq(1, 0));
        assert!(!q.can_dequeue_n_subq(1, 1));

        q.dequeue_subq(0).unwrap();
        q.release_subq(0).unwrap();
        assert!(q.is_empty_subq(0));
        assert!(!q.is_empty_subq(1));

        // The whole-queue control block is untouched by subq traffic.
        assert!(q.is_empty());
    }

    #[test]
    fn test_subq_bad_index() {
        let q = queue(2, 2);
        assert_eq!(
            q.acquire_subq(2).unwrap_err(),
            QueueError::BadSubQueue { idx: 2, count: 2 }
        );
        assert!(!q.can_acquire_n_subq(1, 9));
    }

    #[test]
    fn test_wrapcount() {
        let q = queue(2, 1);
        for _ in 0..2 {
            q.acquire().unwrap();
            q.enqueue().unwrap();
            q.dequeue().unwrap();
            q.release().unwrap();
        }
        assert_eq!(q.wrapcount(), 1);
        assert_eq!(q.dequeued_buf_idx(), 0);
    }

    #[test]
    fn test_acquired_and_dequeued_idx() {
        let q = queue(4, 1);
        q.acquire_n(2).unwrap();
        assert_eq!(q.acquired_buf_idx(), 0);
        q.enqueue().unwrap();
        assert_eq!(q.acquired_buf_idx(), 1);

        q.dequeue().unwrap();
        assert_eq!(q.dequeued_buf_idx(), 0);
        q.release().unwrap();
        assert_eq!(q.dequeued_buf_idx(), 1);
    }

    #[test]
    fn test_zero_predicates() {
        let q = queue(2, 1);
        assert!(q.num_acquired_is_zero());
        assert!(q.num_dequeued_is_zero());

        q.acquire().unwrap();
        assert!(!q.num_acquired_is_zero());
        q.enqueue().unwrap();
        assert!(q.num_acquired_is_zero());

        q.dequeue().unwrap();
        assert!(!q.num_dequeued_is_zero());
        q.release().unwrap();
        assert!(q.num_dequeued_is_zero());
    }

    #[test]
    fn test_queue_id() {
        let q = queue(2, 1);
        assert_eq!(q.id(), 7);
    }

    #[test]
    fn test_host_cell_split() {
        // Producer and consumer on separate threads sharing the queue;
        // the counters' acquire/release ordering keeps them consistent.
        use std::sync::Arc;

        let q = Arc::new(queue(4, 1));
        let total = 200usize;

        let producer = {
            let q = Arc::clone(&q);
            std::thread::spawn(move || {
                let mut sent = 0;
                while sent < total {
                    if q.can_acquire_n(1) {
                        q.acquire().unwrap();
                        q.enqueue().unwrap();
                        sent += 1;
                    } else {
                        std::thread::yield_now();
                    }
                }
            })
        };

        let consumer = {
            let q = Arc::clone(&q);
            std::thread::spawn(move || {
                let mut seen = 0;
                while seen < total {
                    if q.can_dequeue_n(1) {
                        q.dequeue().unwrap();
                        q.release().unwrap();
                        seen += 1;
                    } else {
                        std::thread::yield_now();
                    }
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();

        assert!(q.is_empty());
        assert_eq!(q.wrapcount(), total / q.num_blocks());
        assert_eq!(q.counts().total(), q.num_blocks());
    }
}
