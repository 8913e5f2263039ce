//! Gate correlation engine.
//!
//! Given the live boards of a gate's two bounding junctions, this module
//! works out which trains will pass the gate soon and whether it is closed.
//!
//! The algorithm:
//! 1. Pair every J1 observation with every J2 observation of the same train
//!    number. A train seen at only one junction is ignored.
//! 2. The junction the train departs first (same-day clock comparison) is
//!    upstream. The downstream observation becomes the reported record,
//!    enriched with both junctions' times and the direction.
//! 3. Place the gate on the straight line J1 → J2 in degree space and
//!    interpolate linearly between the two departures (both moved past
//!    midnight if already behind "now"). This assumes constant speed and
//!    ignores track geometry.
//! 4. Keep trains whose gate passage falls inside the near-term window,
//!    soonest first. Any kept train means the gate is closed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, warn};

use crate::domain::{
    ClockTime, Coordinate, Direction, Gate, GateResult, StationCode, TrainObservation,
};
use crate::window::NearTermWindow;

/// Which way a paired train runs between the two junctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelDirection {
    J1ToJ2,
    J2ToJ1,
}

impl TravelDirection {
    /// Infer direction from the two departures.
    ///
    /// Equal departures carry no direction information; they are treated as
    /// J1 → J2.
    pub fn infer(j1_departure: ClockTime, j2_departure: ClockTime) -> Self {
        if j1_departure <= j2_departure {
            TravelDirection::J1ToJ2
        } else {
            TravelDirection::J2ToJ1
        }
    }
}

impl fmt::Display for TravelDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelDirection::J1ToJ2 => f.write_str("J1 to J2"),
            TravelDirection::J2ToJ1 => f.write_str("J2 to J1"),
        }
    }
}

/// Live trains per junction code, fetched once per batch.
#[derive(Debug, Clone, Default)]
pub struct JunctionBoards {
    boards: HashMap<StationCode, Arc<Vec<TrainObservation>>>,
}

impl JunctionBoards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: StationCode, trains: Arc<Vec<TrainObservation>>) {
        self.boards.insert(code, trains);
    }

    /// Trains at `code`; empty if the junction was not fetched.
    pub fn get(&self, code: &StationCode) -> &[TrainObservation] {
        self.boards.get(code).map(|t| t.as_slice()).unwrap_or(&[])
    }
}

/// One junction's side of a correlation.
#[derive(Debug, Clone, Copy)]
pub struct JunctionSide<'a> {
    pub code: StationCode,
    pub position: Coordinate,
    pub trains: &'a [TrainObservation],
}

/// Fraction of the J1 → J2 straight line at which the gate lies.
///
/// Distances are Euclidean in degree space. A degenerate segment (J1 at
/// the same point as J2) gives 0. The value is not clamped, so a gate
/// beyond J2 yields a fraction above 1.
pub fn passage_fraction(j1: Coordinate, j2: Coordinate, gate: Coordinate) -> f64 {
    let total = j1.planar_distance(&j2);
    if total > 0.0 {
        j1.planar_distance(&gate) / total
    } else {
        0.0
    }
}

/// Estimated clock time the train reaches the gate.
///
/// Both departures are first placed on or after `now`, then the gate time is
/// `departure_at_j1 + fraction * (departure_at_j2 - departure_at_j1)`,
/// truncated to the minute.
///
/// Returns `None` when the offset is not representable, which happens for
/// gates absurdly far outside the junction segment.
pub fn gate_passage_time(
    j1_departure: ClockTime,
    j2_departure: ClockTime,
    fraction: f64,
    now: NaiveDateTime,
) -> Option<ClockTime> {
    let t1 = j1_departure.next_occurrence(now);
    let t2 = j2_departure.next_occurrence(now);
    let span_secs = t2.signed_duration_since(t1).num_seconds() as f64;
    let offset_secs = (span_secs * fraction).floor();
    if !offset_secs.is_finite() {
        return None;
    }
    // Saturating cast; out-of-range values are rejected by try_seconds
    let offset = TimeDelta::try_seconds(offset_secs as i64)?;
    t1.checked_add_signed(offset).map(ClockTime::from_datetime)
}

/// The correlation engine, configured with its look-ahead window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Correlator {
    window: NearTermWindow,
}

impl Correlator {
    pub fn new(window: NearTermWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> NearTermWindow {
        self.window
    }

    /// Correlate one gate against the pre-fetched junction boards.
    ///
    /// Gates lacking either junction, a junction position, or a usable gate
    /// position are reported as `Unknown` without running the engine.
    pub fn correlate(&self, gate: &Gate, boards: &JunctionBoards, now: NaiveDateTime) -> GateResult {
        let (Some(j1), Some(j2)) = (&gate.junctions.before, &gate.junctions.after) else {
            warn!(gate = %gate.gate_id, "skipping gate: junctions unknown");
            return GateResult::unknown(gate.gate_id.clone());
        };
        let (Some(j1_pos), Some(j2_pos)) = (j1.position, j2.position) else {
            warn!(gate = %gate.gate_id, "skipping gate: junction position unknown");
            return GateResult::unknown(gate.gate_id.clone());
        };
        if !gate.position.is_finite() {
            warn!(gate = %gate.gate_id, "skipping gate: gate position unusable");
            return GateResult::unknown(gate.gate_id.clone());
        }

        let trains = self.passing_trains(
            JunctionSide {
                code: j1.code,
                position: j1_pos,
                trains: boards.get(&j1.code),
            },
            JunctionSide {
                code: j2.code,
                position: j2_pos,
                trains: boards.get(&j2.code),
            },
            gate.position,
            now,
        );

        GateResult::from_trains(gate.gate_id.clone(), trains)
    }

    /// Trains seen at both junctions that pass the gate within the window,
    /// soonest first.
    pub fn passing_trains(
        &self,
        j1: JunctionSide<'_>,
        j2: JunctionSide<'_>,
        gate: Coordinate,
        now: NaiveDateTime,
    ) -> Vec<TrainObservation> {
        let fraction = passage_fraction(j1.position, j2.position, gate);

        let mut kept: Vec<(i64, TrainObservation)> = Vec::new();

        for a in j1.trains {
            for b in j2.trains.iter().filter(|b| b.train_number == a.train_number) {
                let Some(enriched) = enrich_pair(a, b, j1.code, j2.code, fraction, now) else {
                    continue;
                };
                let Some(passage) = enriched.schedule.gate_passage else {
                    continue;
                };

                let within = self.window.contains(passage, now);
                debug!(
                    train = %enriched.train_number,
                    gate_passage = %passage,
                    within,
                    "gate passage estimated"
                );
                if within {
                    kept.push((passage.minutes_until(now), enriched));
                }
            }
        }

        kept.sort_by_key(|(until, _)| *until);
        kept.into_iter().map(|(_, t)| t).collect()
    }
}

/// Merge one train's J1 and J2 observations into the reported record.
///
/// Returns `None` if either departure time is unknown or the gate passage
/// cannot be computed.
fn enrich_pair(
    at_j1: &TrainObservation,
    at_j2: &TrainObservation,
    j1_code: StationCode,
    j2_code: StationCode,
    fraction: f64,
    now: NaiveDateTime,
) -> Option<TrainObservation> {
    let j1_dep = at_j1.schedule.departure.clock()?;
    let j2_dep = at_j2.schedule.departure.clock()?;

    let direction = TravelDirection::infer(j1_dep, j2_dep);
    let (mut record, from, to) = match direction {
        TravelDirection::J1ToJ2 => (at_j2.clone(), j1_code, j2_code),
        TravelDirection::J2ToJ1 => (at_j1.clone(), j2_code, j1_code),
    };

    record.direction = Direction {
        from: Some(from),
        to: Some(to),
    };
    record.schedule.arrival_at_j1 = Some(at_j1.schedule.arrival);
    record.schedule.departure_at_j1 = Some(j1_dep);
    record.schedule.arrival_at_j2 = Some(at_j2.schedule.arrival);
    record.schedule.departure_at_j2 = Some(j2_dep);
    record.schedule.gate_passage = Some(gate_passage_time(j1_dep, j2_dep, fraction, now)?);

    Some(record)
}
