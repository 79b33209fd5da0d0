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

//! Monotonic time primitives for the scheduling engine.
//!
//! All due times are expressed as a [`DueOffset`] — milliseconds since a
//! fixed reference instant captured by the [`MonotonicClock`] at engine
//! construction. Ordering therefore never depends on the wall clock, so
//! leap seconds, NTP slews, and user clock changes cannot reorder or
//! starve pending work.

mod clock;

pub use self::clock::{DueOffset, MonotonicClock};
