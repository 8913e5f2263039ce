//! Route to controlling-junction lookup.
//!
//! Each route is bounded by two junctions whose live boards are queried to
//! estimate traffic through the gates on that route. The table is fixed and
//! independent of the station catalog.

use std::collections::HashMap;

use crate::domain::{Coordinate, StationCode, StationRef};

/// A station used as a live-data query point.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub name: String,
    pub code: StationCode,
    pub position: Coordinate,
}

impl Junction {
    pub fn to_ref(&self) -> StationRef {
        StationRef {
            name: self.name.clone(),
            code: self.code,
            position: Some(self.position),
        }
    }
}

/// Route name → (J1, J2).
#[derive(Debug, Clone, Default)]
pub struct JunctionTable {
    routes: HashMap<String, (Junction, Junction)>,
}

impl JunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the bounding junctions of a route.
    pub fn add(&mut self, route: impl Into<String>, j1: Junction, j2: Junction) {
        self.routes.insert(route.into(), (j1, j2));
    }

    /// The junction pair controlling `route`, if the route is known.
    pub fn get(&self, route: &str) -> Option<(&Junction, &Junction)> {
        self.routes.get(route).map(|(j1, j2)| (j1, j2))
    }

    /// Returns the number of routes with a junction pair.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder for a junction table.
///
/// Junctions are declared once by code and then referenced by code when
/// assigning routes; entries with unknown or invalid codes are skipped.
#[derive(Debug, Default)]
pub struct JunctionTableBuilder {
    junctions: HashMap<StationCode, Junction>,
    inner: JunctionTable,
}

impl JunctionTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a junction.
    pub fn junction(mut self, code: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        if let Ok(code) = StationCode::parse(code) {
            self.junctions.insert(
                code,
                Junction {
                    name: name.to_string(),
                    code,
                    position: Coordinate::new(latitude, longitude),
                },
            );
        }
        self
    }

    /// Assign two declared junctions to a route.
    pub fn route(mut self, route: &str, j1: &str, j2: &str) -> Self {
        let lookup = |code: &str| {
            StationCode::parse(code)
                .ok()
                .and_then(|c| self.junctions.get(&c).cloned())
        };
        if let (Some(j1), Some(j2)) = (lookup(j1), lookup(j2)) {
            self.inner.add(route, j1, j2);
        }
        self
    }

    pub fn build(self) -> JunctionTable {
        self.inner
    }
}

/// The Kerala junction table.
pub fn kerala_junctions() -> JunctionTable {
    JunctionTableBuilder::new()
        .junction("TVC", "Thiruvananthapuram Central", 8.5241391, 76.9366376)
        .junction("QLN", "Kollam Jn", 8.8932118, 76.6141396)
        .junction("KYJ", "Kayamkulam Jn", 9.1748422, 76.5013352)
        .junction("ERS", "Ernakulam Jn", 9.9816358, 76.2998842)
        .junction("NCJ", "Nagercoil Jn", 8.1744, 77.4332)
        .junction("SCT", "Sengottai", 8.9755, 77.2498)
        .route("Trivandrum to Kollam", "NCJ", "QLN")
        .route("Kollam to Kayamkulam", "QLN", "KYJ")
        .route("Kayamkulam - Ernakulam via Alappuzha", "KYJ", "ERS")
        .route("Kayamkulam via Kottayam to Ernakulam", "KYJ", "ERS")
        .route("Kollam - Aryankavu", "QLN", "SCT")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kerala_table_has_all_routes() {
        let table = kerala_junctions();
        assert_eq!(table.len(), 5);

        let (j1, j2) = table.get("Kollam to Kayamkulam").unwrap();
        assert_eq!(j1.code.as_str(), "QLN");
        assert_eq!(j2.code.as_str(), "KYJ");
    }

    #[test]
    fn unknown_route_is_none() {
        let table = kerala_junctions();
        assert!(table.get("Shoranur to Mangalore").is_none());
    }

    #[test]
    fn builder_skips_undeclared_junctions() {
        let table = JunctionTableBuilder::new()
            .junction("QLN", "Kollam Jn", 8.89, 76.61)
            .route("Somewhere", "QLN", "XYZ")
            .build();
        assert!(table.is_empty());
    }

    #[test]
    fn junction_ref_carries_position() {
        let table = kerala_junctions();
        let (j1, _) = table.get("Trivandrum to Kollam").unwrap();
        let r = j1.to_ref();
        assert_eq!(r.code.as_str(), "NCJ");
        assert_eq!(r.position, Some(Coordinate::new(8.1744, 77.4332)));
    }
}
