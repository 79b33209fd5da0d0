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

//! End-to-end behavior of the scheduling engine: ordering, timing,
//! cancellation, bulk cancellation, duplicate rejection, and isolation
//! of failing units.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tickforge_core::{EventId, FnEvent, OwnerId, ScheduleError};
use tickforge_engine::{DispatchPool, Scheduler, SchedulerConfig, SchedulerHandle};

fn started_scheduler() -> Scheduler {
    let mut scheduler = Scheduler::new(SchedulerConfig {
        idle_recheck: Duration::from_millis(100),
        ..Default::default()
    });
    scheduler.start();
    scheduler
}

#[test]
fn later_scheduled_but_earlier_due_unit_fires_first() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();

    // Scenario: A at 2000ms, B at 500ms, scheduled back to back.
    let slow = scheduler
        .schedule(Box::new(FnEvent::system(|| {})), Duration::from_millis(700))
        .unwrap();
    let fast = scheduler
        .schedule(Box::new(FnEvent::system(|| {})), Duration::from_millis(150))
        .unwrap();

    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first.id(), fast, "The earlier-due unit must fire first");
    assert_eq!(second.id(), slow);

    scheduler.stop();
}

#[test]
fn equal_delays_fire_in_scheduling_order() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();

    let delay = Duration::from_millis(120);
    let ids: Vec<EventId> = (0..5)
        .map(|_| {
            scheduler
                .schedule(Box::new(FnEvent::system(|| {})), delay)
                .unwrap()
        })
        .collect();

    let fired: Vec<EventId> = (0..5)
        .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap().id())
        .collect();
    assert_eq!(fired, ids, "Equal due times must keep FIFO order");

    scheduler.stop();
}

#[test]
fn units_do_not_fire_prematurely() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();

    let delay = Duration::from_millis(200);
    let scheduled_at = Instant::now();
    let id = scheduler
        .schedule(Box::new(FnEvent::system(|| {})), delay)
        .unwrap();

    let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    let elapsed = scheduled_at.elapsed();
    // Millisecond resolution: the clock may round the due offset down.
    assert!(
        elapsed >= delay.saturating_sub(Duration::from_millis(5)),
        "Unit fired after {elapsed:?}, before its {delay:?} delay"
    );
    assert!(
        elapsed < delay + Duration::from_millis(500),
        "Unit fired after {elapsed:?}, far beyond its {delay:?} delay"
    );
    assert_eq!(fired.id(), id);

    scheduler.stop();
}

#[test]
fn cancelled_unit_never_fires() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();

    // Scenario: schedule at 2000ms, cancel after 100ms, observe nothing.
    let doomed = scheduler
        .schedule(Box::new(FnEvent::system(|| {})), Duration::from_millis(400))
        .unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(scheduler.cancel(&doomed), "Cancel should find the unit");

    assert!(
        rx.recv_timeout(Duration::from_millis(700)).is_err(),
        "No notification may arrive for a unit cancelled before its due time"
    );

    scheduler.stop();
}

#[test]
fn owner_sweep_cancels_only_that_owner() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();
    let session = OwnerId(42);
    let bystander = OwnerId(7);

    // Scenario: three units for owner 42, one for another owner; the
    // disconnect sweep must leave the bystander untouched.
    for _ in 0..3 {
        scheduler
            .schedule(
                Box::new(FnEvent::new(session, || {})),
                Duration::from_millis(300),
            )
            .unwrap();
    }
    let survivor = scheduler
        .schedule(
            Box::new(FnEvent::new(bystander, || {})),
            Duration::from_millis(300),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(scheduler.cancel_all_for_owner(session), 3);

    let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(fired.id(), survivor);
    assert_eq!(fired.owner(), bystander);
    assert!(
        rx.recv_timeout(Duration::from_millis(500)).is_err(),
        "None of the swept owner's units may fire"
    );

    scheduler.stop();
}

#[test]
fn immediate_unit_fires_within_a_small_bound() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();

    let scheduled_at = Instant::now();
    scheduler
        .schedule_now(Box::new(FnEvent::system(|| {})))
        .unwrap();
    rx.recv_timeout(Duration::from_millis(250))
        .expect("Immediate unit should be delivered promptly");
    assert!(
        scheduled_at.elapsed() < Duration::from_millis(250),
        "Immediate delivery took {:?}",
        scheduled_at.elapsed()
    );

    scheduler.stop();
}

#[test]
fn double_scheduling_the_same_identity_fails_and_fires_once() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();

    // Two instances carrying one identity model the same unit being
    // handed over twice without a cancel in between.
    struct Shared(EventId);
    impl tickforge_core::SchedulableEvent for Shared {
        fn id(&self) -> EventId {
            self.0
        }
        fn owner(&self) -> OwnerId {
            OwnerId::SYSTEM
        }
        fn process(self: Box<Self>) {}
    }

    let id = EventId::new();
    scheduler
        .schedule(Box::new(Shared(id)), Duration::from_millis(100))
        .unwrap();
    let err = scheduler
        .schedule(Box::new(Shared(id)), Duration::from_millis(100))
        .unwrap_err();
    assert_eq!(err, ScheduleError::AlreadyScheduled { id });

    let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(fired.id(), id);
    assert!(
        rx.recv_timeout(Duration::from_millis(300)).is_err(),
        "Exactly one notification may exist for the identity"
    );

    scheduler.stop();
}

#[test]
fn a_panicking_unit_does_not_delay_the_next_one() {
    let mut scheduler = started_scheduler();
    let mut pool = DispatchPool::spawn(1, scheduler.subscribe());

    scheduler
        .schedule(
            Box::new(FnEvent::system(|| panic!("scripted failure"))),
            Duration::from_millis(50),
        )
        .unwrap();

    let ran = Arc::new(AtomicBool::new(false));
    let captured = Arc::clone(&ran);
    scheduler
        .schedule(
            Box::new(FnEvent::system(move || {
                captured.store(true, Ordering::SeqCst);
            })),
            Duration::from_millis(100),
        )
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    while !ran.load(Ordering::SeqCst) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(
        ran.load(Ordering::SeqCst),
        "The unit scheduled after the panicking one should still run on time"
    );

    pool.stop();
    scheduler.stop();
}

#[test]
fn concurrent_producers_all_get_their_units_fired() {
    let mut scheduler = started_scheduler();
    let rx = scheduler.subscribe();

    let handles: Vec<thread::JoinHandle<Vec<EventId>>> = (0..4)
        .map(|producer| {
            let handle: SchedulerHandle = scheduler.handle();
            thread::spawn(move || {
                (0..25)
                    .map(|i| {
                        handle
                            .schedule(
                                Box::new(FnEvent::new(OwnerId(producer), || {})),
                                Duration::from_millis(20 + i),
                            )
                            .unwrap()
                    })
                    .collect()
            })
        })
        .collect();

    let mut expected: Vec<EventId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let mut fired: Vec<EventId> = (0..expected.len())
        .map(|_| rx.recv_timeout(Duration::from_secs(3)).unwrap().id())
        .collect();

    expected.sort();
    fired.sort();
    assert_eq!(fired, expected, "Every scheduled unit fires exactly once");

    scheduler.stop();
}

#[test]
fn rescheduling_from_inside_a_unit_works() {
    let mut scheduler = started_scheduler();
    let handle = scheduler.handle();
    let mut pool = DispatchPool::spawn(1, scheduler.subscribe());

    // A regeneration-style pulse that re-arms itself a fixed number of
    // times through a cloned handle.
    let pulses = Arc::new(Mutex::new(0u32));

    fn pulse(handle: SchedulerHandle, pulses: Arc<Mutex<u32>>, remaining: u32) {
        *pulses.lock().unwrap() += 1;
        if remaining > 0 {
            let next_handle = handle.clone();
            handle
                .schedule(
                    Box::new(FnEvent::new(OwnerId(9), move || {
                        pulse(next_handle, pulses, remaining - 1)
                    })),
                    Duration::from_millis(20),
                )
                .unwrap();
        }
    }

    {
        let handle = handle.clone();
        let pulses = Arc::clone(&pulses);
        handle
            .clone()
            .schedule_now(Box::new(FnEvent::new(OwnerId(9), move || {
                pulse(handle, pulses, 4)
            })))
            .unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(2);
    while *pulses.lock().unwrap() < 5 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(*pulses.lock().unwrap(), 5, "Each pulse should re-arm the next");

    pool.stop();
    scheduler.stop();
}
