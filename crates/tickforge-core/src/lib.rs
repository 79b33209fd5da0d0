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

//! # Tickforge Core
//!
//! Foundational crate containing the schedulable-unit contract, identity
//! types, the monotonic reference clock, and the due-notification channel
//! that the scheduling engine publishes on.
//!
//! Every time-driven subsystem of a game server (combat cooldowns,
//! creature movement ticks, spawn timers, condition expiry) expresses its
//! deferred work as a [`SchedulableEvent`] and hands it to the engine in
//! `tickforge-engine`; when the unit becomes due, an [`EventFired`]
//! notification is delivered over the [`NotificationBus`].

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod time;

pub use error::{ScheduleError, ScheduleResult};
pub use event::{
    EventFired, EventId, FiredReceiver, FiredSender, FnEvent, NotificationBus, OwnerId,
    SchedulableEvent,
};
pub use time::{DueOffset, MonotonicClock};
