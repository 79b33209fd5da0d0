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

use std::fmt;
use std::time::{Duration, Instant};

/// A point on the engine's timeline: whole milliseconds since the
/// reference instant.
///
/// This is the heap ordering key for pending units. It is fixed once a
/// unit is enqueued; rescheduling means cancel-and-schedule-again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DueOffset(u64);

impl DueOffset {
    /// The reference instant itself.
    pub const ZERO: DueOffset = DueOffset(0);

    /// Creates an offset from whole milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Returns the offset as whole milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns this offset moved forward by `delay`, saturating at the
    /// timeline's end rather than wrapping.
    pub fn saturating_add(&self, delay: Duration) -> Self {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(delay_ms))
    }

    /// Returns how far this offset lies after `earlier`, or
    /// `Duration::ZERO` if it does not.
    pub fn saturating_since(&self, earlier: DueOffset) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for DueOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}ms", self.0)
    }
}

/// The engine's clock: a fixed reference instant captured once at
/// construction, against which every [`DueOffset`] is measured.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Captures the reference instant and starts the timeline at zero.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Returns the current position on the engine's timeline.
    #[inline]
    pub fn now(&self) -> DueOffset {
        DueOffset(self.epoch.elapsed().as_millis() as u64)
    }

    /// Translates a caller-relative delay into an absolute due offset.
    #[inline]
    pub fn due_after(&self, delay: Duration) -> DueOffset {
        self.now().saturating_add(delay)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
