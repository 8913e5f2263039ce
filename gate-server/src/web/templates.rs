//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{ClockTime, GateStatus, StationCode, StationRef, TrainObservation};

use super::dto::GateReport;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page with the request form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

// ============================================================================
// Fragment Templates (AJAX responses, no base.html)
// ============================================================================

/// Gate status results fragment.
#[derive(Template)]
#[template(path = "gate_results.html")]
pub struct GateResultsTemplate {
    pub gates: Vec<GateView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Gate view model for templates.
#[derive(Debug, Clone)]
pub struct GateView {
    pub gate_id: String,
    pub route: String,
    pub nearest_station: String,
    pub adjacent_stations: String,
    pub junctions: String,
    pub status: String,
    /// CSS class for the status badge
    pub status_class: &'static str,
    pub trains: Vec<TrainView>,
}

impl GateView {
    pub fn from_report(report: &GateReport) -> Self {
        let gate = &report.gate;
        let status_class = match report.gate_status {
            GateStatus::Closed => "status-closed",
            GateStatus::Open => "status-open",
            GateStatus::Unknown => "status-unknown",
        };

        Self {
            gate_id: gate.gate_id.to_string(),
            route: gate.route.clone().unwrap_or_else(|| "Unknown route".into()),
            nearest_station: station_label(gate.nearest_station.as_ref()),
            adjacent_stations: format!(
                "{} / {}",
                station_label(gate.adjacent_stations.before.as_ref()),
                station_label(gate.adjacent_stations.after.as_ref())
            ),
            junctions: format!(
                "{} / {}",
                station_label(gate.junctions.before.as_ref()),
                station_label(gate.junctions.after.as_ref())
            ),
            status: report.gate_status.to_string(),
            status_class,
            trains: report.live_trains.iter().map(TrainView::from_observation).collect(),
        }
    }
}

/// Train view model for templates.
#[derive(Debug, Clone)]
pub struct TrainView {
    pub number: String,
    pub name: String,
    pub route: String,
    /// "QLN → KYJ"
    pub direction: String,
    pub gate_passage: String,
    pub departure_j1: String,
    pub departure_j2: String,
}

impl TrainView {
    pub fn from_observation(t: &TrainObservation) -> Self {
        let code = |c: Option<StationCode>| {
            c.map(|c| c.to_string()).unwrap_or_else(|| "?".into())
        };
        let time = |t: Option<ClockTime>| t.map(|t| t.to_string()).unwrap_or_default();

        Self {
            number: t.train_number.to_string(),
            name: t.train_name.clone(),
            route: t.route.full_route.clone(),
            direction: format!("{} → {}", code(t.direction.from), code(t.direction.to)),
            gate_passage: time(t.schedule.gate_passage),
            departure_j1: time(t.schedule.departure_at_j1),
            departure_j2: time(t.schedule.departure_at_j2),
        }
    }
}

fn station_label(station: Option<&StationRef>) -> String {
    match station {
        Some(s) => format!("{} ({})", s.name, s.code),
        None => "-".to_string(),
    }
}
