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
use super::schedulable::SchedulableEvent;
use crate::time::DueOffset;
use std::fmt;

/// The due-notification: announces that a unit's due time has elapsed
/// and the unit has been dequeued for execution.
///
/// Carries ownership of the boxed unit, so whoever consumes the
/// notification decides where `process` runs. Dequeue-then-notify is a
/// single transition from the engine's point of view: once an
/// `EventFired` exists, the unit is no longer cancellable.
pub struct EventFired {
    /// The dequeued unit, ready to be processed.
    pub event: Box<dyn SchedulableEvent>,
    /// The offset at which the unit was due.
    pub due: DueOffset,
}

impl EventFired {
    /// The identity of the fired unit.
    pub fn id(&self) -> EventId {
        self.event.id()
    }

    /// The owner of the fired unit.
    pub fn owner(&self) -> OwnerId {
        self.event.owner()
    }

    /// Consumes the notification and runs the unit's deferred work.
    pub fn process(self) {
        self.event.process()
    }
}

impl fmt::Debug for EventFired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFired")
            .field("id", &self.event.id())
            .field("owner", &self.event.owner())
            .field("due", &self.due)
            .finish()
    }
}
