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

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A globally unique identifier for a schedulable unit.
///
/// Assigned once at construction and immutable afterwards. The 128-bit
/// random (version 4) UUID makes collisions negligible for the lifetime
/// of an engine instance, so cancellation and duplicate detection can
/// key on identity alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new, random (version 4) `EventId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    /// Creates a new, random (version 4) `EventId`.
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The logical owner on whose behalf a unit was scheduled.
///
/// This is an opaque integer (a creature id, a session id, ...), never a
/// live object reference, so units and the engine cannot form reference
/// cycles with their owners. It exists so that all pending work of one
/// owner can be invalidated in a single sweep when that owner goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

impl OwnerId {
    /// The conventional "system-owned" owner: no specific requestor.
    pub const SYSTEM: OwnerId = OwnerId(0);

    /// Returns whether this is the system owner.
    pub fn is_system(&self) -> bool {
        *self == Self::SYSTEM
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::SYSTEM
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner:{}", self.0)
    }
}

impl From<u64> for OwnerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn event_ids_are_unique() {
        let ids: HashSet<EventId> = (0..1000).map(|_| EventId::new()).collect();
        assert_eq!(ids.len(), 1000, "Freshly generated ids should not collide");
    }

    #[test]
    fn default_owner_is_system() {
        assert_eq!(OwnerId::default(), OwnerId::SYSTEM);
        assert!(OwnerId::SYSTEM.is_system());
        assert!(!OwnerId(42).is_system());
    }

    #[test]
    fn owner_display_includes_raw_value() {
        assert_eq!(OwnerId(42).to_string(), "owner:42");
    }
}
