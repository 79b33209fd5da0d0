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

//! The schedulable-unit contract and the due-notification plumbing.
//!
//! A [`SchedulableEvent`] is an opaque piece of deferred work with a
//! stable [`EventId`] and an [`OwnerId`] naming the logical requestor.
//! The engine never inspects what a unit does; it only announces that
//! the unit has become due by publishing an [`EventFired`] on the
//! [`NotificationBus`].
//!
//! Keeping these primitives in `tickforge-core` lets producer crates
//! (combat, movement, spawning) define concrete units without depending
//! on the engine itself.

mod bus;
mod fired;
mod id;
mod schedulable;

pub use self::bus::{FiredReceiver, FiredSender, NotificationBus};
pub use self::fired::EventFired;
pub use self::id::{EventId, OwnerId};
pub use self::schedulable::{FnEvent, SchedulableEvent};
