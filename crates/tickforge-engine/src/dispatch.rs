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

//! Worker-pool consumption of due-notifications.
//!
//! The dispatch loop only decides *when* a unit fires; running the
//! unit's body is the consumer's job. This pool is the recommended
//! consumer when `process` bodies can block: each notification is taken
//! by exactly one worker, so a slow unit delays nothing but itself.
//! Pickup order follows channel order; completion order across workers
//! is unspecified.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tickforge_core::FiredReceiver;

/// How long an idle worker waits on the channel before re-checking the
/// stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A fixed pool of worker threads that execute fired units.
///
/// A panic escaping a unit's `process` body is caught at this boundary
/// and logged with the unit's identity; the worker then moves on to the
/// next notification, so one broken unit cannot starve or crash the
/// timer subsystem.
pub struct DispatchPool {
    running: Arc<AtomicBool>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl DispatchPool {
    /// Spawns `workers` threads consuming `receiver`.
    pub fn spawn(workers: usize, receiver: FiredReceiver) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let handles = (0..workers.max(1))
            .map(|index| {
                let rx = receiver.clone();
                let running = Arc::clone(&running);
                thread::spawn(move || worker_loop(index, rx, running))
            })
            .collect();
        log::info!("Dispatch pool started with {} worker(s).", workers.max(1));
        Self {
            running,
            workers: handles,
        }
    }

    /// Signals all workers to exit and joins them.
    ///
    /// Notifications already picked up finish executing; notifications
    /// still in the channel are left there.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for DispatchPool {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(index: usize, rx: FiredReceiver, running: Arc<AtomicBool>) {
    log::debug!("Dispatch worker {index} started.");
    while running.load(Ordering::Relaxed) {
        let fired = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(fired) => fired,
            Err(flume::RecvTimeoutError::Timeout) => continue,
            Err(flume::RecvTimeoutError::Disconnected) => break,
        };

        let id = fired.id();
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || fired.process()));
        if outcome.is_err() {
            log::error!("Unit {id} panicked during processing; worker {index} continues");
        }
    }
    log::debug!("Dispatch worker {index} stopped.");
}
