#![no_std]
#![no_main]

/*
 * A pelican crossing on the DESPI-M02 board: one lane of cars, one
 * pedestrian crossing, and a request button that cuts the cars' green
 * short. The phase logic lives in pelican-core; this binary wires it to
 * the board and drives it from a fixed-cadence polling loop.
 */

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel};
use embassy_time::{Duration, Ticker};
use pelican_core::{Crossing, Lamps};
use {defmt_rtt as _, panic_probe as _};

mod alarms;
mod io;

use alarms::Alarms;
use io::{CHANNEL_CAPACITY, LampFeed};

/// Cadence of the polling loop that samples the button and keeps the
/// alarm bookkeeping straight.
const POLL_TICK: Duration = Duration::from_millis(250);
/// Quiet time before a button level change is taken at face value.
const DEBOUNCE: Duration = Duration::from_millis(50);

static LAMPS: Channel<ThreadModeRawMutex, Lamps, CHANNEL_CAPACITY> = Channel::new();
static BUTTON_RAW: Channel<ThreadModeRawMutex, bool, CHANNEL_CAPACITY> = Channel::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());

    spawner
        .spawn(io::io_task(
            peripherals,
            LAMPS.receiver(),
            BUTTON_RAW.sender(),
        ))
        .unwrap();
    spawner
        .spawn(io::debounce_task(BUTTON_RAW.receiver(), DEBOUNCE))
        .unwrap();

    let mut alarm_pool = Alarms::new(spawner);
    let mut lamp_feed = LampFeed(LAMPS.sender());
    let mut crossing: Crossing<Alarms> = Crossing::new(&mut lamp_feed);
    info!("pelican crossing up, starting in {}", crossing.phase());

    let mut ticker = Ticker::every(POLL_TICK);
    loop {
        match select(ticker.next(), alarms::FIRED.receive()).await {
            Either::First(()) => {
                let pressed = io::button_pressed();
                if crossing.tick(&mut alarm_pool, &mut lamp_feed, pressed).is_err() {
                    warn!("no free alarm slot, re-arming on the next tick");
                }
            }
            Either::Second(fired) => {
                crossing.alarm_fired(fired.id, fired.destination, &mut alarm_pool, &mut lamp_feed);
            }
        }
    }
}
