//! Domain types for the gate status server.
//!
//! These types represent validated railway data. All types enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod coordinate;
mod gate;
mod station;
mod time;
mod train;
mod train_number;

pub use coordinate::Coordinate;
pub use gate::{
    AdjacentStations, Gate, GateId, GateJunctions, GateResult, GateStatus, StationRef,
};
pub use station::{InvalidStationCode, Station, StationCode};
pub use time::{ClockTime, ScheduleTime, TimeError, UNKNOWN_TIME};
pub use train::{Direction, ObservationMetadata, Schedule, TrainObservation, TrainRoute};
pub use train_number::TrainNumber;
