//! Railway level-crossing gate status server.
//!
//! A web service that answers: "Is this level-crossing gate about to close?"
//! Each gate is placed on a route between two junctions; trains seen on both
//! junctions' live boards are interpolated to the gate's position, and a gate
//! with any train due in the near-term window is reported closed.

pub mod cache;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod correlate;
pub mod domain;
pub mod extract;
pub mod locator;
pub mod orchestrator;
pub mod web;
pub mod window;
