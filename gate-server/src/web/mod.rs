//! Web layer for the gate status server.
//!
//! Accepts gate batches from the map client and returns each gate's
//! location details and estimated status, as JSON or an HTML fragment.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
