//! Static station catalog and route index.
//!
//! Provides route → ordered stations and route → junction pair lookups,
//! plus nearest-station and nearest-route queries by coordinate. Loaded
//! once at startup; the process fails fast if the catalog is unavailable.

mod error;
mod index;
mod junctions;
mod loader;

pub use error::CatalogError;
pub use index::{Neighbourhood, StationIndex};
pub use junctions::{Junction, JunctionTable, JunctionTableBuilder, kerala_junctions};
pub use loader::{load_catalog, parse_catalog};
