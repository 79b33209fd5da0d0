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

//! Demo runtime: a miniature game-server wiring of the scheduling
//! engine. Schedules a creature spawn, a few movement ticks, a
//! self-rearming regeneration pulse, and a cooldown that a simulated
//! session disconnect sweeps away before it can fire.

use anyhow::Result;
use std::thread;
use std::time::Duration;
use tickforge_core::{FnEvent, OwnerId};
use tickforge_engine::{DispatchPool, Scheduler, SchedulerConfig, SchedulerHandle};

const SESSION_PLAYER: OwnerId = OwnerId(1001);
const CREATURE_RAT: OwnerId = OwnerId(2001);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut scheduler = Scheduler::new(SchedulerConfig {
        idle_recheck: Duration::from_millis(250),
        ..Default::default()
    });
    let mut pool = DispatchPool::spawn(2, scheduler.subscribe());
    scheduler.start();

    let handle = scheduler.handle();

    // A one-shot spawn timer.
    handle.schedule(
        Box::new(FnEvent::new(CREATURE_RAT, || {
            log::info!("Rat spawned in sewer cell (3, 7)");
        })),
        Duration::from_millis(300),
    )?;

    // Movement ticks for the same creature, one step each.
    for step in 1..=3u32 {
        handle.schedule(
            Box::new(FnEvent::new(CREATURE_RAT, move || {
                log::info!("Rat takes step {step}");
            })),
            Duration::from_millis(400 + 150 * u64::from(step)),
        )?;
    }

    // A regeneration pulse that re-arms itself through a cloned handle.
    schedule_regen_pulse(handle.clone(), 3)?;

    // A long attack cooldown for the player session...
    let cooldown = handle.schedule(
        Box::new(FnEvent::new(SESSION_PLAYER, || {
            log::warn!("Attack cooldown expired (should have been swept!)");
        })),
        Duration::from_secs(10),
    )?;

    // ...swept away when the session disconnects.
    thread::sleep(Duration::from_millis(600));
    let swept = handle.cancel_all_for_owner(SESSION_PLAYER);
    log::info!("Session {SESSION_PLAYER} disconnected; {swept} timer(s) invalidated");
    if handle.cancel(&cooldown) {
        log::warn!("Cooldown survived the owner sweep; cancelled individually");
    }

    thread::sleep(Duration::from_millis(1500));
    log::info!("{} unit(s) still pending at shutdown", handle.pending());

    scheduler.stop();
    pool.stop();
    Ok(())
}

fn schedule_regen_pulse(handle: SchedulerHandle, remaining: u32) -> Result<()> {
    let rearm = handle.clone();
    handle.schedule(
        Box::new(FnEvent::new(SESSION_PLAYER, move || {
            log::info!("Player regenerates 5 hp ({remaining} pulse(s) left)");
            if remaining > 1 {
                if let Err(e) = schedule_regen_pulse(rearm, remaining - 1) {
                    log::error!("Failed to re-arm regeneration: {e}");
                }
            }
        })),
        Duration::from_millis(250),
    )?;
    Ok(())
}
