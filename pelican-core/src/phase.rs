/*
 * The phase table for the crossing: which lamps burn in each phase, how
 * long the crossing dwells there and which phase follows when the dwell
 * runs out. Everything is a total match, so there is no way to introduce
 * a phase without deciding all three.
 */

use enum_ordinalize::Ordinalize;

/// Time for the pedestrians to cross (ms).
pub const PEDESTRIANS_PASS_MS: u64 = 8_000;
/// Time either warning phase holds before the right of way flips (ms).
pub const WARNING_MS: u64 = 4_000;
/// Maximum time the cars keep their green before the pedestrians get a
/// turn (ms). A button press cuts this short.
pub const CARS_PASS_MS: u64 = 16_000;

#[derive(Ordinalize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Phase {
    PedestriansPass,
    PedestriansWarning,
    CarsPass,
    CarsWarning,
}

/// The five lamp lines of the crossing, `true` for lit. The I/O layer
/// deals with electrical polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lamps {
    pub car_red: bool,
    pub car_amber: bool,
    pub car_green: bool,
    pub pedestrian_red: bool,
    pub pedestrian_green: bool,
}

impl Phase {
    pub const ALL: [Phase; Phase::VARIANT_COUNT] = [
        Phase::PedestriansPass,
        Phase::PedestriansWarning,
        Phase::CarsPass,
        Phase::CarsWarning,
    ];

    /*
     * Determine the phase that follows on the dwell timer, without
     * changing the phase that we are in. `CarsPass` also has a button
     * edge to `CarsWarning`; that one is the crossing's business, not
     * the table's.
     */
    pub fn timed_successor(&self) -> Phase {
        match self {
            Phase::PedestriansPass => Phase::PedestriansWarning,
            Phase::PedestriansWarning => Phase::CarsPass,
            Phase::CarsPass => Phase::CarsWarning,
            Phase::CarsWarning => Phase::PedestriansPass,
        }
    }

    pub fn dwell_ms(&self) -> u64 {
        match self {
            Phase::PedestriansPass => PEDESTRIANS_PASS_MS,
            Phase::PedestriansWarning | Phase::CarsWarning => WARNING_MS,
            Phase::CarsPass => CARS_PASS_MS,
        }
    }

    pub fn lamps(&self) -> Lamps {
        match self {
            Phase::PedestriansPass => Lamps {
                car_red: true,
                car_amber: false,
                car_green: false,
                pedestrian_red: false,
                pedestrian_green: true,
            },
            // The pedestrian figure is already red while the stragglers
            // clear the crossing; the cars get red-and-amber.
            Phase::PedestriansWarning => Lamps {
                car_red: true,
                car_amber: true,
                car_green: false,
                pedestrian_red: true,
                pedestrian_green: false,
            },
            Phase::CarsPass => Lamps {
                car_red: false,
                car_amber: false,
                car_green: true,
                pedestrian_red: true,
                pedestrian_green: false,
            },
            Phase::CarsWarning => Lamps {
                car_red: false,
                car_amber: true,
                car_green: false,
                pedestrian_red: true,
                pedestrian_green: false,
            },
        }
    }
}
