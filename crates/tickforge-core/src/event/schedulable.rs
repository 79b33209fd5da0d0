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

use super::id::{EventId, OwnerId};

/// An opaque piece of deferred work with stable identity and ownership.
///
/// Concrete units close over whatever domain payload their work needs
/// (the creature to move, the spell to resolve); the engine never looks
/// inside. `process` takes `Box<Self>` by value, so a unit is consumed
/// when it runs: the type system itself enforces the at-most-once
/// execution guarantee, and a unit can never run after a successful
/// cancellation because cancellation removes the only boxed instance.
pub trait SchedulableEvent: Send {
    /// The unique identity assigned to this unit at construction.
    fn id(&self) -> EventId;

    /// The logical owner on whose behalf this unit was scheduled.
    fn owner(&self) -> OwnerId;

    /// Executes the unit's deferred work.
    ///
    /// Invoked at most once, after the unit's due time has elapsed and
    /// it has been dequeued. Failures inside the body are the unit's
    /// own responsibility; the engine only isolates them so one broken
    /// unit cannot take down the timer subsystem.
    fn process(self: Box<Self>);
}

/// A closure-backed schedulable unit.
///
/// The common case for producers: deferred work that is most naturally
/// written as a closure capturing its payload, without defining a
/// bespoke unit type.
///
/// ```
/// use tickforge_core::{FnEvent, OwnerId, SchedulableEvent};
///
/// let unit = FnEvent::new(OwnerId(7), || println!("respawn rat #3"));
/// let id = unit.id();
/// Box::new(unit).process();
/// # let _ = id;
/// ```
pub struct FnEvent {
    id: EventId,
    owner: OwnerId,
    body: Box<dyn FnOnce() + Send>,
}

impl FnEvent {
    /// Creates a unit owned by `owner` that runs `body` when due.
    pub fn new<F>(owner: OwnerId, body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id: EventId::new(),
            owner,
            body: Box::new(body),
        }
    }

    /// Creates a system-owned unit (no specific requestor).
    pub fn system<F>(body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(OwnerId::SYSTEM, body)
    }
}

impl SchedulableEvent for FnEvent {
    fn id(&self) -> EventId {
        self.id
    }

    fn owner(&self) -> OwnerId {
        self.owner
    }

    fn process(self: Box<Self>) {
        (self.body)()
    }
}
