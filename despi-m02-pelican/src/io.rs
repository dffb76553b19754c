/*
 * The I/O module for the crossing.
 *
 * This module implements a task that is responsible for controlling the
 * actual I/O pins on the device. The intention is for this module to be
 * the only part of the program that is device-specific.
 *
 * The I/O task owns the five lamp outputs and the button input. Lamp
 * updates arrive over a channel; button edges are forwarded to the
 * debouncer task, which publishes the settled level for the control loop
 * to poll.
 */

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{Either, select};
use embassy_stm32::{
    Peripherals,
    exti::{Channel, ExtiInput},
    gpio::{Level, Output, Pin, Pull, Speed},
};
use embassy_sync::{
    blocking_mutex::raw::ThreadModeRawMutex,
    channel::{Receiver, Sender},
};
use embassy_time::{Duration, Timer};
use pelican_core::{LampDriver, Lamps};

pub const CHANNEL_CAPACITY: usize = 4;

/// Debounced button level, written by the debouncer task.
static BUTTON_PRESSED: AtomicBool = AtomicBool::new(false);

/// The debounced level of the pedestrian button, sampled fresh on each
/// call. Level-based: a held button reads pressed on every call during
/// the hold.
pub fn button_pressed() -> bool {
    BUTTON_PRESSED.load(Ordering::Relaxed)
}

/// Hands lamp updates from the state machine to the I/O task. Commits
/// happen inside the control loop and must not block, so a full channel
/// is reported rather than waited out.
pub struct LampFeed(pub Sender<'static, ThreadModeRawMutex, Lamps, CHANNEL_CAPACITY>);

impl LampDriver for LampFeed {
    fn apply(&mut self, lamps: Lamps) {
        if self.0.try_send(lamps).is_err() {
            defmt::warn!("lamp channel full, update dropped");
        }
    }
}

#[embassy_executor::task]
pub async fn io_task(
    peripherals: Peripherals,
    lamps: Receiver<'static, ThreadModeRawMutex, Lamps, CHANNEL_CAPACITY>,
    button_raw: Sender<'static, ThreadModeRawMutex, bool, CHANNEL_CAPACITY>,
) -> ! {
    // Lamp pins on the DESPI-M02 header, active-high. Both reds burn
    // until the first mapping arrives, so a half-initialized crossing
    // never waves anyone through.
    let mut car_lamps: [Output; 3] = [
        Output::new(peripherals.PE1.degrade(), Level::High, Speed::Low), // red
        Output::new(peripherals.PB9.degrade(), Level::Low, Speed::Low),  // amber
        Output::new(peripherals.PB7.degrade(), Level::Low, Speed::Low),  // green
    ];
    let mut pedestrian_lamps: [Output; 2] = [
        Output::new(peripherals.PB6.degrade(), Level::High, Speed::Low), // red
        Output::new(peripherals.PB8.degrade(), Level::Low, Speed::Low),  // green
    ];

    // The button pulls the line low when pressed.
    let mut button = ExtiInput::new(
        peripherals.PE11.degrade(),
        peripherals.EXTI11.degrade(),
        Pull::Up,
    );

    loop {
        match select(lamps.receive(), button.wait_for_any_edge()).await {
            Either::First(update) => light(&mut car_lamps, &mut pedestrian_lamps, &update),
            Either::Second(()) => button_raw.send(button.is_low()).await,
        }
    }
}

// Deal with active-high or active-low, so that the state machine can
// just use easy to understand `true` for on logic.
fn light(car_lamps: &mut [Output; 3], pedestrian_lamps: &mut [Output; 2], lamps: &Lamps) {
    set(&mut car_lamps[0], lamps.car_red);
    set(&mut car_lamps[1], lamps.car_amber);
    set(&mut car_lamps[2], lamps.car_green);
    set(&mut pedestrian_lamps[0], lamps.pedestrian_red);
    set(&mut pedestrian_lamps[1], lamps.pedestrian_green);
}

fn set(led: &mut Output, on: bool) {
    led.set_level(if on { Level::High } else { Level::Low });
}

// The pedestrian button bounces, and pedestrians drum on it. Rather than
// chasing every electrical edge, wait until the line has been quiet for
// the debounce interval and only then take the level at face value. The
// control loop polls that settled level; it never sees the chatter.
#[embassy_executor::task]
pub async fn debounce_task(
    input: Receiver<'static, ThreadModeRawMutex, bool, CHANNEL_CAPACITY>,
    debounce: Duration,
) -> ! {
    loop {
        let mut value: bool = input.receive().await;

        'debounce_loop: loop {
            match select(input.receive(), Timer::after(debounce)).await {
                Either::First(new_value) => value = new_value,
                Either::Second(_) => break 'debounce_loop,
            }
        }

        BUTTON_PRESSED.store(value, Ordering::Relaxed);
    }
}
