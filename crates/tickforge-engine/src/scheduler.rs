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

//! The scheduler service: producer API plus the single dispatch thread.
//!
//! Any number of producer threads call `schedule` / `cancel` /
//! `cancel_all_for_owner`; exactly one background thread runs the
//! dispatch loop and is the only code that ever dequeues units for
//! firing. The loop's one suspension point is a condition-variable wait
//! bounded by the next deadline (or a configurable idle re-check when
//! the queue is empty), so the engine neither busy-waits nor oversleeps
//! a newly installed earlier deadline.

use crate::queue::TimerQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;
use tickforge_core::{
    EventFired, EventId, FiredReceiver, FiredSender, MonotonicClock, NotificationBus, OwnerId,
    SchedulableEvent, ScheduleResult,
};

/// Configuration for the scheduler service.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How long the dispatch loop sleeps when no work is pending before
    /// re-checking liveness. Also the upper bound on how late a unit
    /// can fire if a wakeup is ever missed.
    pub idle_recheck: Duration,
    /// Initial capacity preallocated for the timer queue.
    pub initial_capacity: usize,
    /// Optional hard bound on pending units. Exceeding it fails
    /// `schedule` loudly; it never drops work silently.
    pub max_pending: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_recheck: Duration::from_millis(500),
            initial_capacity: 64,
            max_pending: None,
        }
    }
}

/// State shared between producer handles and the dispatch thread.
struct Shared {
    queue: Mutex<TimerQueue>,
    wake: Condvar,
    running: AtomicBool,
    clock: MonotonicClock,
}

impl Shared {
    fn schedule(&self, event: Box<dyn SchedulableEvent>, delay: Duration) -> ScheduleResult<EventId> {
        let due = self.clock.due_after(delay);
        let mut queue = self.queue.lock().unwrap();
        let previous_min = queue.next_due();
        let id = queue.insert(event, due)?;
        drop(queue);

        // Only a new earliest deadline can shorten the loop's wait; any
        // later entry will be seen when its turn comes.
        if previous_min.is_none_or(|min| due < min) {
            self.wake.notify_one();
        }
        log::trace!("Scheduled unit {id} for {due}");
        Ok(id)
    }

    fn cancel(&self, id: &EventId) -> bool {
        let removed = self.queue.lock().unwrap().cancel(id);
        if removed {
            log::trace!("Cancelled unit {id}");
        }
        removed
    }

    fn cancel_all_for_owner(&self, owner: OwnerId) -> usize {
        let removed = self.queue.lock().unwrap().cancel_owner(owner);
        if removed > 0 {
            log::debug!("Cancelled {removed} pending unit(s) for {owner}");
        }
        removed
    }

    fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

/// A clonable producer-side handle to the scheduler.
///
/// Subsystems hold one of these (never a global); cloning is cheap and
/// every clone talks to the same queue.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Arc<Shared>,
}

impl SchedulerHandle {
    /// Enqueues `event` to fire once `delay` has elapsed from now.
    pub fn schedule(
        &self,
        event: Box<dyn SchedulableEvent>,
        delay: Duration,
    ) -> ScheduleResult<EventId> {
        self.shared.schedule(event, delay)
    }

    /// Enqueues `event` to fire as soon as the dispatch loop runs.
    pub fn schedule_now(&self, event: Box<dyn SchedulableEvent>) -> ScheduleResult<EventId> {
        self.shared.schedule(event, Duration::ZERO)
    }

    /// Removes the pending unit with the given identity, if any.
    ///
    /// Best-effort by design: if the dispatch loop has already dequeued
    /// the unit for firing, this returns `false` even though the
    /// notification may not have been observed yet. Callers must treat
    /// firing and cancellation as racing events.
    pub fn cancel(&self, id: &EventId) -> bool {
        self.shared.cancel(id)
    }

    /// Removes every pending unit belonging to `owner` in one atomic
    /// sweep. Typical use: a session disconnects and all of its
    /// in-flight timers must be invalidated together.
    pub fn cancel_all_for_owner(&self, owner: OwnerId) -> usize {
        self.shared.cancel_all_for_owner(owner)
    }

    /// Number of currently pending units, for diagnostics.
    pub fn pending(&self) -> usize {
        self.shared.pending()
    }
}

/// The deferred-event scheduling engine.
///
/// Owns the timer queue exclusively and the background dispatch thread.
/// Constructed explicitly and passed around by [`SchedulerHandle`];
/// there is deliberately no global instance.
pub struct Scheduler {
    shared: Arc<Shared>,
    bus: NotificationBus,
    config: SchedulerConfig,
    handle: Option<thread::JoinHandle<()>>,
}

impl Scheduler {
    /// Creates a stopped scheduler. The reference instant of the
    /// engine's timeline is captured here.
    pub fn new(config: SchedulerConfig) -> Self {
        let queue = match config.max_pending {
            Some(capacity) => TimerQueue::bounded(capacity),
            None => TimerQueue::new(config.initial_capacity),
        };
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(queue),
                wake: Condvar::new(),
                running: AtomicBool::new(false),
                clock: MonotonicClock::new(),
            }),
            bus: NotificationBus::new(),
            config,
            handle: None,
        }
    }

    /// Creates a stopped scheduler with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SchedulerConfig::default())
    }

    /// Returns a clonable producer handle.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns a receiver for due-notifications.
    ///
    /// May be called any number of times; each notification is consumed
    /// by exactly one receiver clone.
    pub fn subscribe(&self) -> FiredReceiver {
        self.bus.receiver()
    }

    /// Starts the dispatch thread. Idempotent while running.
    pub fn start(&mut self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let sender = self.bus.sender();
        let idle_recheck = self.config.idle_recheck;
        self.handle = Some(thread::spawn(move || {
            dispatch_loop(shared, sender, idle_recheck);
        }));
    }

    /// Signals the dispatch thread to exit and joins it.
    ///
    /// Pending units stay in the queue; they fire if the scheduler is
    /// started again and their due time has elapsed. Nothing is
    /// persisted across process restarts.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        // Take the queue lock so the notification cannot slip between
        // the loop's running check and its condvar wait.
        drop(self.shared.queue.lock().unwrap());
        self.shared.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Whether the dispatch thread is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// See [`SchedulerHandle::schedule`].
    pub fn schedule(
        &self,
        event: Box<dyn SchedulableEvent>,
        delay: Duration,
    ) -> ScheduleResult<EventId> {
        self.shared.schedule(event, delay)
    }

    /// See [`SchedulerHandle::schedule_now`].
    pub fn schedule_now(&self, event: Box<dyn SchedulableEvent>) -> ScheduleResult<EventId> {
        self.shared.schedule(event, Duration::ZERO)
    }

    /// See [`SchedulerHandle::cancel`].
    pub fn cancel(&self, id: &EventId) -> bool {
        self.shared.cancel(id)
    }

    /// See [`SchedulerHandle::cancel_all_for_owner`].
    pub fn cancel_all_for_owner(&self, owner: OwnerId) -> usize {
        self.shared.cancel_all_for_owner(owner)
    }

    /// Number of currently pending units.
    pub fn pending(&self) -> usize {
        self.shared.pending()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The single-consumer dispatch loop.
///
/// Wakes on a new earliest deadline, on the computed timeout, or on the
/// stop signal; drains everything due, publishes the notifications
/// outside the lock, then sleeps until the next deadline.
fn dispatch_loop(shared: Arc<Shared>, sender: FiredSender, idle_recheck: Duration) {
    log::info!("Scheduler dispatch loop started.");

    let mut queue = shared.queue.lock().unwrap();
    while shared.running.load(Ordering::Relaxed) {
        let now = shared.clock.now();

        // Drain everything due, in (due, insertion) order.
        let mut due_batch: Vec<EventFired> = Vec::new();
        while let Some((event, due)) = queue.pop_due(now) {
            due_batch.push(EventFired { event, due });
        }

        if !due_batch.is_empty() {
            // Delivery happens outside the lock: a slow consumer must
            // never stall producers or the queue.
            drop(queue);
            for fired in due_batch {
                log::trace!("Unit {} fired ({})", fired.id(), fired.due);
                if let Err(e) = sender.send(fired) {
                    log::error!(
                        "Dropped due-notification for {}: no receiver connected",
                        e.into_inner().id()
                    );
                }
            }
            queue = shared.queue.lock().unwrap();
            // More units may have come due while delivering.
            continue;
        }

        let timeout = match queue.next_due() {
            Some(due) => due.saturating_since(shared.clock.now()),
            None => idle_recheck,
        };
        let (guard, _) = shared.wake.wait_timeout(queue, timeout).unwrap();
        queue = guard;
    }

    log::info!("Scheduler dispatch loop stopped.");
}
