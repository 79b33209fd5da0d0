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

//! # Tickforge Engine
//!
//! The deferred-event scheduling engine that drives all time-based game
//! logic: combat cooldowns, creature movement ticks, spawn timers,
//! condition expiry. Producers hand opaque
//! [`SchedulableEvent`](tickforge_core::SchedulableEvent)s to the
//! [`Scheduler`]; a single dispatch thread sleeps until the earliest
//! deadline and publishes an
//! [`EventFired`](tickforge_core::EventFired) per due unit, in due-time
//! order with FIFO tie-break. A [`DispatchPool`] can consume those
//! notifications on worker threads so a blocking unit body never stalls
//! the loop.
//!
//! Concurrency model: multiple producers, one consumer. The only shared
//! state is the timer queue behind a mutex; the loop's only suspension
//! point is a condition-variable wait bounded by the next deadline.

pub mod dispatch;
pub mod queue;
pub mod scheduler;

pub use dispatch::DispatchPool;
pub use queue::TimerQueue;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};
