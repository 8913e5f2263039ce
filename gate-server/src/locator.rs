//! Gate locator.
//!
//! Places a raw gate coordinate on the rail network: which route it is on,
//! which station it is nearest, that station's neighbours, and the two
//! junctions that bound the route. Pure and deterministic.

use tracing::warn;

use crate::catalog::StationIndex;
use crate::domain::{AdjacentStations, Coordinate, Gate, GateId, GateJunctions};

/// Locate one gate.
///
/// A gate whose coordinate cannot be matched to a known route keeps `None`
/// for everything it could not resolve; the correlation engine later
/// reports such gates as `Unknown`.
pub fn locate_gate(
    index: &StationIndex,
    gate_id: GateId,
    position: Coordinate,
    route_shape: &[Coordinate],
) -> Gate {
    let route = if position.is_finite() {
        index.nearest_route(position, route_shape)
    } else {
        None
    };

    let Some(route) = route else {
        warn!(gate = %gate_id, "gate could not be matched to any route");
        return Gate {
            gate_id,
            position,
            route: None,
            nearest_station: None,
            adjacent_stations: AdjacentStations::default(),
            junctions: GateJunctions::default(),
        };
    };

    let neighbourhood = index.nearest_station_and_neighbors(position, route);
    let junctions = index.junctions_by_route(route);

    Gate {
        gate_id,
        position,
        route: Some(route.to_string()),
        nearest_station: neighbourhood.map(|n| n.nearest.to_ref()),
        adjacent_stations: AdjacentStations {
            before: neighbourhood.and_then(|n| n.before).map(|s| s.to_ref()),
            after: neighbourhood.and_then(|n| n.after).map(|s| s.to_ref()),
        },
        junctions: GateJunctions {
            before: junctions.map(|(j1, _)| j1.to_ref()),
            after: junctions.map(|(_, j2)| j2.to_ref()),
        },
    }
}
