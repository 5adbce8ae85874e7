// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property tests for the buffer queue conservation invariant:
//! `free + acquired + published + dequeued == capacity` must hold before
//! and after every operation, for any operation sequence, and a false
//! `can_*` predicate must imply the operation is rejected.

use bufqueue::{BufBlock, BufQueue};
use proptest::prelude::*;

/// One step of the four-phase protocol, possibly infeasible.
#[derive(Debug, Clone, Copy)]
enum Op {
    Acquire(usize),
    Enqueue(usize),
    Dequeue(usize),
    Release(usize),
}

fn op_strategy(max_n: usize) -> impl Strategy<Value = Op> {
    (0usize..4, 0..=max_n).prop_map(|(which, n)| match which {
        0 => Op::Acquire(n),
        1 => Op::Enqueue(n),
        2 => Op::Dequeue(n),
        _ => Op::Release(n),
    })
}

fn apply(q: &BufQueue, op: Op) {
    // Feasibility must agree with the operation outcome; infeasible
    // operations must change nothing.
    let before = q.counts();
    match op {
        Op::Acquire(n) => {
            let feasible = q.can_acquire_n(n);
            let result = q.acquire_n(n);
            assert_eq!(feasible, result.is_ok(), "can_acquire_n disagrees with acquire_n");
            if !feasible {
                assert_eq!(q.counts(), before, "rejected acquire changed state");
            }
        }
        Op::Enqueue(n) => {
            let feasible = before.acquired >= n;
            assert_eq!(feasible, q.enqueue_n(n).is_ok());
        }
        Op::Dequeue(n) => {
            let feasible = q.can_dequeue_n(n);
            let result = q.dequeue_n(n);
            assert_eq!(feasible, result.is_ok(), "can_dequeue_n disagrees with dequeue_n");
            if !feasible {
                assert_eq!(q.counts(), before, "rejected dequeue changed state");
            }
        }
        Op::Release(n) => {
            let feasible = before.dequeued >= n;
            assert_eq!(feasible, q.release_n(n).is_ok());
        }
    }
}

proptest! {
    #[test]
    fn conservation_holds_for_any_op_sequence(
        capacity in 1usize..8,
        ops in proptest::collection::vec(op_strategy(8), 1..200),
    ) {
        let q = BufQueue::new(0, capacity, vec![BufBlock::new(0, 64, 8, 8)]).unwrap();

        prop_assert_eq!(q.counts().total(), capacity);
        for op in ops {
            apply(&q, op);
            prop_assert_eq!(q.counts().total(), capacity);
        }
    }

    #[test]
    fn subq_conservation_is_independent(
        capacity in 1usize..6,
        ops in proptest::collection::vec((op_strategy(6), 0usize..3), 1..120),
    ) {
        let blocks = vec![
            BufBlock::new(0x0000, 64, 8, 8),
            BufBlock::new(0x1000, 64, 8, 8),
            BufBlock::new(0x2000, 64, 8, 8),
        ];
        let q = BufQueue::new(1, capacity, blocks).unwrap();

        for (op, idx) in ops {
            let before = q.counts_subq(idx).unwrap();
            let result = match op {
                Op::Acquire(n) => q.acquire_n_subq(n, idx).map(|_| ()),
                Op::Enqueue(n) => q.enqueue_n_subq(n, idx),
                Op::Dequeue(n) => q.dequeue_n_subq(n, idx).map(|_| ()),
                Op::Release(n) => q.release_n_subq(n, idx),
            };
            if result.is_err() {
                // A rejected operation leaves the counters untouched.
                prop_assert_eq!(q.counts_subq(idx).unwrap(), before);
            }

            // Every sub-queue conserves its own capacity, and the
            // whole-queue control block stays untouched.
            for sub in 0..3 {
                prop_assert_eq!(q.counts_subq(sub).unwrap().total(), capacity);
            }
            prop_assert!(q.is_empty());
        }
    }

    #[test]
    fn wrapcount_counts_full_traversals(
        capacity in 1usize..5,
        rounds in 1usize..20,
    ) {
        let q = BufQueue::new(2, capacity, vec![BufBlock::new(0, 16, 4, 4)]).unwrap();

        for _ in 0..rounds {
            for _ in 0..capacity {
                q.acquire().unwrap();
                q.enqueue().unwrap();
                q.dequeue().unwrap();
                q.release().unwrap();
            }
        }
        prop_assert_eq!(q.wrapcount(), rounds);
    }
}
