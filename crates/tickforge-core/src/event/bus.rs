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

use super::fired::EventFired;

/// Sending half of the due-notification channel.
pub type FiredSender = flume::Sender<EventFired>;

/// Receiving half of the due-notification channel.
///
/// Clonable: several workers may pull from the same receiver, in which
/// case each notification is taken by exactly one of them, in channel
/// order.
pub type FiredReceiver = flume::Receiver<EventFired>;

/// The thread-safe channel the engine announces due units on.
///
/// The dispatch loop is the producer; any number of consumers (a
/// handler registry, a worker pool) pull [`EventFired`] notifications
/// off the receiving half. The channel is unbounded so that a slow
/// consumer can never stall the dispatch loop inside delivery.
#[derive(Debug)]
pub struct NotificationBus {
    sender: FiredSender,
    receiver: FiredReceiver,
}

impl NotificationBus {
    /// Creates a new bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Publishes a due-notification, logging if every receiver is gone.
    ///
    /// A disconnected bus means the fired unit is dropped unprocessed;
    /// that is a wiring bug in the surrounding application, not a
    /// recoverable condition for the engine, so it is logged and the
    /// loop carries on.
    pub fn publish(&self, fired: EventFired) {
        log::trace!("Publishing due-notification for {}", fired.id());

        if let Err(e) = self.sender.send(fired) {
            log::error!(
                "Dropped due-notification for {}: no receiver connected",
                e.into_inner().id()
            );
        }
    }

    /// Returns a clone of the sending half.
    pub fn sender(&self) -> FiredSender {
        self.sender.clone()
    }

    /// Returns a clone of the receiving half.
    pub fn receiver(&self) -> FiredReceiver {
        self.receiver.clone()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
