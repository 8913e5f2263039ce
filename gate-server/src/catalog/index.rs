//! Station and route index.
//!
//! Built once at startup from the station catalog and the junction table,
//! then shared read-only by every request.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Coordinate, Station};

use super::junctions::{Junction, JunctionTable};

/// A gate's nearest station and that station's sequence neighbours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbourhood<'a> {
    pub nearest: &'a Station,
    /// Previous station in route order, `None` at the start of the route
    pub before: Option<&'a Station>,
    /// Next station in route order, `None` at the end of the route
    pub after: Option<&'a Station>,
}

/// Immutable route → station sequence and route → junction lookup.
#[derive(Debug, Clone)]
pub struct StationIndex {
    stations: Vec<Station>,
    /// Route name → indices into `stations`, in catalog (geographic) order
    by_route: HashMap<String, Vec<usize>>,
    junctions: JunctionTable,
}

impl StationIndex {
    /// Build the index. Station order within each route follows `stations`.
    pub fn new(stations: Vec<Station>, junctions: JunctionTable) -> Self {
        let mut by_route: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, station) in stations.iter().enumerate() {
            for route in &station.routes {
                by_route.entry(route.clone()).or_default().push(idx);
            }
        }

        Self {
            stations,
            by_route,
            junctions,
        }
    }

    /// Returns the number of stations in the catalog.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Returns the number of distinct routes.
    pub fn route_count(&self) -> usize {
        self.by_route.len()
    }

    /// Stations on `route`, in route order. Empty for an unknown route.
    pub fn stations_by_route(&self, route: &str) -> Vec<&Station> {
        self.by_route
            .get(route)
            .map(|idxs| idxs.iter().map(|&i| &self.stations[i]).collect())
            .unwrap_or_default()
    }

    /// The junction pair controlling `route`.
    ///
    /// A route missing from the junction table is logged and yields `None`.
    pub fn junctions_by_route(&self, route: &str) -> Option<(&Junction, &Junction)> {
        let pair = self.junctions.get(route);
        if pair.is_none() {
            warn!(route, "route not found in junction table");
        }
        pair
    }

    /// Find the station on `route` closest to `position`, with its neighbours.
    ///
    /// Distance is great-circle. Stations without coordinates are never
    /// chosen as nearest but still count as neighbours. Returns `None` for an
    /// unknown route or one with no located station.
    pub fn nearest_station_and_neighbors(
        &self,
        position: Coordinate,
        route: &str,
    ) -> Option<Neighbourhood<'_>> {
        let seq = self.stations_by_route(route);

        let (nearest_idx, _) = seq
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.position.map(|p| (i, position.haversine_m(&p))))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        Some(Neighbourhood {
            nearest: seq[nearest_idx],
            before: nearest_idx.checked_sub(1).map(|i| seq[i]),
            after: seq.get(nearest_idx + 1).copied(),
        })
    }

    /// Find the route a position most likely lies on.
    ///
    /// Two stages: the route-shape point closest to `position`, then the
    /// catalog station closest to that point. The station's primary route is
    /// the answer. `None` when the shape or the located catalog is empty.
    pub fn nearest_route(&self, position: Coordinate, route_shape: &[Coordinate]) -> Option<&str> {
        let anchor = route_shape
            .iter()
            .filter(|c| c.is_finite())
            .min_by(|a, b| position.haversine_m(a).total_cmp(&position.haversine_m(b)))?;

        self.stations
            .iter()
            .filter_map(|s| s.position.map(|p| (s, anchor.haversine_m(&p))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(s, _)| s.route_name())
    }
}
