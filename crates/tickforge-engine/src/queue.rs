// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The pending-unit store: a min-heap over due offsets plus an identity
//! index for fast cancellation.
//!
//! The heap holds lightweight keys only; the boxed units live in the
//! index. Cancellation removes the index entry and leaves the heap key
//! behind as a stale marker that `pop_due`/`next_due` skip lazily. This
//! keeps insert and pop at O(log n) while cancel — the hot path when a
//! session disconnects — is O(1) per unit.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tickforge_core::{DueOffset, EventId, OwnerId, SchedulableEvent, ScheduleError, ScheduleResult};

/// Heap ordering key: due offset first, insertion sequence second.
///
/// The sequence number is a monotonically increasing counter, so units
/// with equal due offsets leave the heap in the order they entered it.
/// Deterministic tie-break; never arbitrary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct HeapKey {
    due: DueOffset,
    seq: u64,
}

struct Slot {
    event: Box<dyn SchedulableEvent>,
    due: DueOffset,
    seq: u64,
}

/// The pending-unit collection owned exclusively by the scheduler.
///
/// Invariants:
/// - at most one live entry per unit identity;
/// - a unit's due offset is fixed while it is enqueued;
/// - every live index entry has exactly one matching heap key
///   (`(due, seq)` pairs are unique because `seq` never repeats).
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<(HeapKey, EventId)>>,
    live: HashMap<EventId, Slot>,
    next_seq: u64,
    capacity: Option<usize>,
}

impl TimerQueue {
    /// Creates an unbounded queue with room preallocated for
    /// `initial_capacity` units.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(initial_capacity),
            live: HashMap::with_capacity(initial_capacity),
            next_seq: 0,
            capacity: None,
        }
    }

    /// Creates a bounded queue; exceeding `capacity` makes `insert`
    /// fail with [`ScheduleError::QueueFull`].
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new(capacity)
        }
    }

    /// Enqueues a unit to fire at `due`.
    ///
    /// ## Returns
    /// The unit's id on success; [`ScheduleError::AlreadyScheduled`] if
    /// this identity is still pending, [`ScheduleError::QueueFull`] if
    /// a bounded queue is exhausted. The queue is unmodified on error.
    pub fn insert(
        &mut self,
        event: Box<dyn SchedulableEvent>,
        due: DueOffset,
    ) -> ScheduleResult<EventId> {
        let id = event.id();
        if self.live.contains_key(&id) {
            return Err(ScheduleError::AlreadyScheduled { id });
        }
        if let Some(capacity) = self.capacity {
            if self.live.len() >= capacity {
                return Err(ScheduleError::QueueFull { capacity });
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((HeapKey { due, seq }, id)));
        self.live.insert(id, Slot { event, due, seq });
        Ok(id)
    }

    /// Removes the pending unit with the given identity.
    ///
    /// ## Returns
    /// `true` if a pending entry was removed, `false` if the identity
    /// is unknown, already fired, or already cancelled.
    pub fn cancel(&mut self, id: &EventId) -> bool {
        self.live.remove(id).is_some()
    }

    /// Removes every pending unit belonging to `owner` in one sweep.
    ///
    /// ## Returns
    /// The number of units removed.
    pub fn cancel_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.live.len();
        self.live.retain(|_, slot| slot.event.owner() != owner);
        before - self.live.len()
    }

    /// Dequeues the earliest pending unit whose due offset has elapsed.
    ///
    /// Stale heap keys left behind by cancellations are discarded on
    /// the way. Repeated calls drain due units in ascending
    /// `(due, seq)` order.
    pub fn pop_due(&mut self, now: DueOffset) -> Option<(Box<dyn SchedulableEvent>, DueOffset)> {
        while let Some(Reverse((key, id))) = self.heap.peek().copied() {
            let is_live = self
                .live
                .get(&id)
                .is_some_and(|slot| slot.seq == key.seq);
            if !is_live {
                // Cancelled entry; drop the stale key and keep looking.
                self.heap.pop();
                continue;
            }
            if key.due > now {
                return None;
            }
            self.heap.pop();
            let slot = self.live.remove(&id).expect("live entry verified above");
            return Some((slot.event, slot.due));
        }
        None
    }

    /// Returns the due offset of the earliest pending unit, discarding
    /// stale heap keys on the way.
    pub fn next_due(&mut self) -> Option<DueOffset> {
        while let Some(Reverse((key, id))) = self.heap.peek().copied() {
            let is_live = self
                .live
                .get(&id)
                .is_some_and(|slot| slot.seq == key.seq);
            if is_live {
                return Some(key.due);
            }
            self.heap.pop();
        }
        None
    }

    /// Number of pending units.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no units are pending.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.live.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickforge_core::FnEvent;

    fn unit(owner: u64) -> Box<dyn SchedulableEvent> {
        Box::new(FnEvent::new(OwnerId(owner), || {}))
    }

    fn at(ms: u64) -> DueOffset {
        DueOffset::from_millis(ms)
    }

    #[test]
    fn pops_in_due_order() {
        let mut queue = TimerQueue::new(8);
        queue.insert(unit(1), at(300)).unwrap();
        queue.insert(unit(1), at(100)).unwrap();
        queue.insert(unit(1), at(200)).unwrap();

        let now = at(1000);
        let order: Vec<u64> = std::iter::from_fn(|| queue.pop_due(now))
            .map(|(_, due)| due.as_millis())
            .collect();
        assert_eq!(order, vec![100, 200, 300]);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_due_offsets_pop_in_insertion_order() {
        let mut queue = TimerQueue::new(8);
        let first = queue.insert(unit(1), at(100)).unwrap();
        let second = queue.insert(unit(2), at(100)).unwrap();
        let third = queue.insert(unit(3), at(100)).unwrap();

        let now = at(100);
        let popped: Vec<EventId> = std::iter::from_fn(|| queue.pop_due(now))
            .map(|(event, _)| event.id())
            .collect();
        assert_eq!(
            popped,
            vec![first, second, third],
            "Ties must resolve FIFO, not arbitrarily"
        );
    }

    #[test]
    fn nothing_pops_before_its_due_offset() {
        let mut queue = TimerQueue::new(8);
        queue.insert(unit(1), at(500)).unwrap();
        assert!(queue.pop_due(at(499)).is_none());
        assert!(queue.pop_due(at(500)).is_some());
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut queue = TimerQueue::new(8);
        let event = FnEvent::new(OwnerId(1), || {});
        let id = event.id();

        // A second instance carrying the same identity stands in for
        // double-scheduling; each FnEvent is otherwise unique.
        queue.insert(Box::new(event), at(100)).unwrap();
        let twin = DuplicateId { id };
        let err = queue.insert(Box::new(twin), at(200)).unwrap_err();
        assert_eq!(err, ScheduleError::AlreadyScheduled { id });
        assert_eq!(queue.len(), 1, "Failed insert must not leave an entry");
    }

    struct DuplicateId {
        id: EventId,
    }

    impl SchedulableEvent for DuplicateId {
        fn id(&self) -> EventId {
            self.id
        }
        fn owner(&self) -> OwnerId {
            OwnerId::SYSTEM
        }
        fn process(self: Box<Self>) {}
    }

    #[test]
    fn cancel_removes_pending_unit() {
        let mut queue = TimerQueue::new(8);
        let id = queue.insert(unit(1), at(100)).unwrap();

        assert!(queue.cancel(&id));
        assert!(!queue.cancel(&id), "Second cancel should miss");
        assert!(queue.pop_due(at(1000)).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_owner_sweeps_only_that_owner() {
        let mut queue = TimerQueue::new(8);
        queue.insert(unit(42), at(100)).unwrap();
        queue.insert(unit(42), at(200)).unwrap();
        queue.insert(unit(42), at(300)).unwrap();
        let survivor = queue.insert(unit(7), at(150)).unwrap();

        assert_eq!(queue.cancel_owner(OwnerId(42)), 3);
        assert_eq!(queue.len(), 1);
        let (event, _) = queue.pop_due(at(1000)).expect("Other owner's unit stays");
        assert_eq!(event.id(), survivor);
    }

    #[test]
    fn next_due_skips_cancelled_entries() {
        let mut queue = TimerQueue::new(8);
        let early = queue.insert(unit(1), at(100)).unwrap();
        queue.insert(unit(1), at(400)).unwrap();

        assert_eq!(queue.next_due(), Some(at(100)));
        queue.cancel(&early);
        assert_eq!(queue.next_due(), Some(at(400)));
    }

    #[test]
    fn bounded_queue_rejects_overflow() {
        let mut queue = TimerQueue::bounded(2);
        let first = queue.insert(unit(1), at(100)).unwrap();
        queue.insert(unit(1), at(200)).unwrap();

        let err = queue.insert(unit(1), at(300)).unwrap_err();
        assert_eq!(err, ScheduleError::QueueFull { capacity: 2 });

        // Cancellation frees a slot again.
        queue.cancel(&first);
        assert!(queue.insert(unit(1), at(300)).is_ok());
    }

    #[test]
    fn reschedule_after_fire_is_allowed() {
        let mut queue = TimerQueue::new(8);
        let event = FnEvent::new(OwnerId(1), || {});
        let id = event.id();
        queue.insert(Box::new(event), at(100)).unwrap();

        let (fired, _) = queue.pop_due(at(100)).unwrap();
        assert_eq!(fired.id(), id);

        // The identity is free again once the unit has left the queue.
        let replacement = DuplicateId { id };
        assert!(queue.insert(Box::new(replacement), at(200)).is_ok());
    }
}
