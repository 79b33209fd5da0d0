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

//! The error taxonomy of the scheduling engine's producer API.
//!
//! Cancellation misses are deliberately *not* errors: `cancel` on an
//! unknown or already-fired id returns `false`, because racing a
//! cancellation against the dispatch loop is expected behavior, not an
//! exceptional one.

use crate::event::EventId;
use std::fmt;

/// A specialized `Result` type for scheduling operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// An error surfaced synchronously by `schedule`/`schedule_now`.
///
/// In both cases the queue is left unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The exact unit instance is already pending. Double-scheduling is
    /// a programming error in the owning subsystem; failing loudly here
    /// keeps it from hiding behind silent deduplication.
    AlreadyScheduled {
        /// The identity of the already-pending unit.
        id: EventId,
    },
    /// A bounded queue has reached its configured capacity. This is a
    /// configuration bug in the surrounding application, never a reason
    /// to drop work silently.
    QueueFull {
        /// The configured capacity that was exceeded.
        capacity: usize,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::AlreadyScheduled { id } => {
                write!(f, "Unit {id} is already pending; cancel it before rescheduling")
            }
            ScheduleError::QueueFull { capacity } => {
                write!(f, "Timer queue is full (capacity {capacity})")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
