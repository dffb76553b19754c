/*
 * One-shot alarms for the crossing, built on the Embassy timer queue.
 *
 * Each armed alarm is a task from a small static pool that sleeps for
 * the requested delay and then reports its expiry on the `FIRED`
 * channel, where the control loop feeds it back into the state machine.
 * A spawned task cannot be aborted, so `cancel` does not try: a
 * cancelled alarm simply expires into a report whose id no longer
 * matches any armed slot, and the state machine drops it. Ids are a
 * sequence that is not reused until it wraps, so a stale report can
 * never pass for a fresh one.
 */

use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel};
use embassy_time::{Duration, Timer};
use pelican_core::{AlarmPool, Phase, PoolExhausted};

/// Alarm tasks that can sleep concurrently: the single live alarm plus
/// any cancelled ones that have not expired yet.
const ALARM_TASKS: usize = 8;

/// Expiry reports, consumed by the control loop.
pub static FIRED: Channel<ThreadModeRawMutex, AlarmFired, CHANNEL_CAPACITY> = Channel::new();

const CHANNEL_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct AlarmId(u32);

#[derive(Clone, Copy, defmt::Format)]
pub struct AlarmFired {
    pub id: AlarmId,
    pub destination: Phase,
}

pub struct Alarms {
    spawner: Spawner,
    next_id: u32,
}

impl Alarms {
    pub fn new(spawner: Spawner) -> Self {
        Alarms {
            spawner,
            next_id: 0,
        }
    }
}

impl AlarmPool for Alarms {
    type Id = AlarmId;

    fn arm(&mut self, delay_ms: u64, destination: Phase) -> Result<AlarmId, PoolExhausted> {
        let id = AlarmId(self.next_id);
        self.spawner
            .spawn(alarm_task(Duration::from_millis(delay_ms), id, destination))
            .map_err(|_| PoolExhausted)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    // The sleeping task keeps running; its report is dropped by the
    // state machine's slot check instead.
    fn cancel(&mut self, _id: AlarmId) {}
}

#[embassy_executor::task(pool_size = ALARM_TASKS)]
async fn alarm_task(delay: Duration, id: AlarmId, destination: Phase) {
    Timer::after(delay).await;
    FIRED.send(AlarmFired { id, destination }).await;
}
