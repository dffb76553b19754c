/*
 * Platform-independent logic for a single-lane pelican crossing: the
 * phase table with its lamp mappings, and the state machine that cycles
 * it on alarms and lets a pedestrian preempt the cars' green with the
 * button. Everything hardware-facing is injected through the `AlarmPool`
 * and `LampDriver` seams, so this crate builds and tests on the host.
 */
#![no_std]

mod crossing;
mod phase;

pub use crossing::{AlarmPool, Crossing, LampDriver, PoolExhausted};
pub use phase::{CARS_PASS_MS, Lamps, PEDESTRIANS_PASS_MS, Phase, WARNING_MS};
