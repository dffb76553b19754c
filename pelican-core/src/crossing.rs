/*
 * The crossing state machine. It owns the current phase and the alarm
 * bookkeeping: one optional alarm handle per destination phase, of which
 * at most one may be armed at any time. The polling loop calls `tick` at
 * a fixed cadence; alarm expiry comes back in through `alarm_fired`.
 * Both paths funnel into `advance_to`, the single place where the phase
 * changes and the lamps are rewritten, so the timed cycle and the button
 * override can never disagree about the bookkeeping.
 */

use enum_ordinalize::Ordinalize;

use crate::phase::{Lamps, Phase};

/// No free alarm slot was available. Transient: the armed slot stays
/// empty and the next tick retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoolExhausted;

impl core::fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("alarm pool exhausted")
    }
}

/*
 * The two seams to the hardware. The firmware plugs in the real device
 * services; the tests plug in recorders.
 */

/// One-shot alarm service. An armed alarm delivers its expiry report at
/// most once, no earlier than `delay_ms` after arming. `cancel` keeps a
/// not-yet-fired report from committing; cancelling a fired or already
/// cancelled handle is a no-op.
pub trait AlarmPool {
    type Id: Copy + PartialEq;

    fn arm(&mut self, delay_ms: u64, destination: Phase) -> Result<Self::Id, PoolExhausted>;
    fn cancel(&mut self, id: Self::Id);
}

/// Sink for lamp updates. Only the four mappings from the phase table
/// ever pass through here, so implementations need not validate them.
pub trait LampDriver {
    fn apply(&mut self, lamps: Lamps);
}

pub struct Crossing<P: AlarmPool> {
    phase: Phase,
    pending: [Option<P::Id>; Phase::VARIANT_COUNT],
}

impl<P: AlarmPool> Crossing<P> {
    /// Start the crossing in `PedestriansPass` with nothing armed and
    /// the matching lamps lit. The first alarm is armed by the first
    /// tick.
    pub fn new(lamps: &mut impl LampDriver) -> Self {
        let crossing = Crossing {
            phase: Phase::PedestriansPass,
            pending: [None; Phase::VARIANT_COUNT],
        };
        lamps.apply(crossing.phase.lamps());
        crossing
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of armed alarms. Never more than one after a tick.
    pub fn armed(&self) -> usize {
        self.pending.iter().filter(|slot| slot.is_some()).count()
    }

    /*
     * Re-evaluate the current phase. Any alarm not aimed at the current
     * successor is a leftover from an override and gets cancelled. A
     * pressed button in `CarsPass` commits the override right here,
     * through the same path an expired alarm would take. Otherwise the
     * successor's alarm is armed, but only if it is not armed already:
     * re-arming on every tick would stack duplicate alarms toward the
     * same phase.
     */
    pub fn tick(
        &mut self,
        pool: &mut P,
        lamps: &mut impl LampDriver,
        button_pressed: bool,
    ) -> Result<(), PoolExhausted> {
        let successor = self.phase.timed_successor();

        for destination in Phase::ALL {
            if destination == successor {
                continue;
            }
            if let Some(id) = self.pending[destination.ordinal()].take() {
                pool.cancel(id);
            }
        }

        if self.phase == Phase::CarsPass && button_pressed {
            self.advance_to(Phase::CarsWarning, pool, lamps);
            return Ok(());
        }

        if self.pending[successor.ordinal()].is_none() {
            let id = pool.arm(self.phase.dwell_ms(), successor)?;
            self.pending[successor.ordinal()] = Some(id);
        }

        Ok(())
    }

    /// Delivery point for alarm expiry reports. A report only commits
    /// while its exact handle is still armed for `destination`; anything
    /// else is the tail of a cancelled or superseded alarm and is
    /// dropped, so a cancel racing a fire can never double-commit.
    pub fn alarm_fired(
        &mut self,
        id: P::Id,
        destination: Phase,
        pool: &mut P,
        lamps: &mut impl LampDriver,
    ) {
        if self.pending[destination.ordinal()] != Some(id) {
            return;
        }
        self.advance_to(destination, pool, lamps);
    }

    /// Commit a transition. The alarm armed toward `next` has either
    /// just fired or is being preempted; either way its slot is taken
    /// and the handle cancelled before the phase and lamps change.
    pub fn advance_to(&mut self, next: Phase, pool: &mut P, lamps: &mut impl LampDriver) {
        if let Some(id) = self.pending[next.ordinal()].take() {
            pool.cancel(id);
        }
        self.phase = next;
        lamps.apply(next.lamps());
        #[cfg(feature = "defmt")]
        defmt::info!("entering {}", next);
    }
}
