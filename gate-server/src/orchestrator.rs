//! Batch orchestration.
//!
//! One request carries many gates. The orchestrator fetches each distinct
//! junction's board exactly once through a single collector session, then
//! runs the correlation engine per gate against those boards.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use futures::future::join_all;
use tracing::{error, info};

use crate::cache::BoardCache;
use crate::collector::{CollectorError, LiveTrainSession, LiveTrainSource};
use crate::correlate::{Correlator, JunctionBoards};
use crate::domain::{ClockTime, Gate, GateId, GateResult, ScheduleTime, StationCode, StationRef};

/// A located gate together with its correlation result.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub gate: Gate,
    pub result: GateResult,
}

/// Runs gate batches against a live train source.
pub struct Orchestrator<S> {
    source: S,
    correlator: Correlator,
    cache: Option<BoardCache>,
    fetch_concurrency: usize,
}

impl<S: LiveTrainSource> Orchestrator<S> {
    /// Create an orchestrator that fetches junctions one at a time, uncached.
    pub fn new(source: S, correlator: Correlator) -> Self {
        Self {
            source,
            correlator,
            cache: None,
            fetch_concurrency: 1,
        }
    }

    /// Reuse junction boards across batches.
    pub fn with_cache(mut self, cache: BoardCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fetch up to `n` junctions at once within a session.
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }

    /// Process one batch of located gates.
    ///
    /// Results follow the input order, except that the gate matching
    /// `selected` (if any) comes first. If no collector session can be
    /// opened, every gate is `Unknown`.
    pub async fn process_batch(
        &self,
        gates: Vec<Gate>,
        selected: Option<&GateId>,
        now: NaiveDateTime,
    ) -> Vec<GateOutcome> {
        let gates = prioritize(gates, selected);
        let codes = unique_junction_codes(&gates);
        info!(
            gates = gates.len(),
            junctions = codes.len(),
            "processing gate batch"
        );

        let boards = match self.collect_boards(&codes, now).await {
            Ok(boards) => boards,
            Err(e) => {
                error!(error = %e, "collector session failed, all gates unknown");
                return gates
                    .into_iter()
                    .map(|gate| GateOutcome {
                        result: GateResult::unknown(gate.gate_id.clone()),
                        gate,
                    })
                    .collect();
            }
        };

        gates
            .into_iter()
            .map(|gate| {
                let result = self.correlator.correlate(&gate, &boards, now);
                log_gate_report(&gate, &result);
                GateOutcome { gate, result }
            })
            .collect()
    }

    /// Fetch the board of every junction in `codes`.
    ///
    /// Cached boards are used where available; the session is opened only
    /// if something is missing, and is always closed once opened. A single
    /// junction's failure yields an empty board for it.
    async fn collect_boards(
        &self,
        codes: &[StationCode],
        now: NaiveDateTime,
    ) -> Result<JunctionBoards, CollectorError> {
        let mut boards = JunctionBoards::new();
        let mut missing = Vec::new();

        for &code in codes {
            let cached = match &self.cache {
                Some(cache) => cache.get(code, now).await,
                None => None,
            };
            match cached {
                Some(board) => boards.insert(code, board),
                None => missing.push(code),
            }
        }

        if missing.is_empty() {
            return Ok(boards);
        }

        let session = self.source.open_session().await?;

        for batch in missing.chunks(self.fetch_concurrency) {
            let futures: Vec<_> = batch
                .iter()
                .map(|&code| {
                    let session = &session;
                    async move {
                        info!(station = %code, "fetching junction board");
                        (code, session.fetch(code, now).await)
                    }
                })
                .collect();

            for (code, result) in join_all(futures).await {
                match result {
                    Ok(trains) => {
                        let board = Arc::new(trains);
                        if let Some(cache) = &self.cache {
                            cache.insert(code, now, Arc::clone(&board)).await;
                        }
                        boards.insert(code, board);
                    }
                    Err(e) => {
                        error!(station = %code, error = %e, "junction fetch failed, using empty board");
                        boards.insert(code, Arc::new(Vec::new()));
                    }
                }
            }
        }

        session.close().await;
        Ok(boards)
    }
}

/// Move the gate matching `selected` to the front, keeping the rest in order.
pub fn prioritize(mut gates: Vec<Gate>, selected: Option<&GateId>) -> Vec<Gate> {
    let Some(selected) = selected else {
        return gates;
    };
    if let Some(pos) = gates.iter().position(|g| &g.gate_id == selected) {
        info!(gate = %selected, "prioritizing selected gate");
        let gate = gates.remove(pos);
        gates.insert(0, gate);
    }
    gates
}

/// Distinct junction codes across `gates`, in first-seen order.
pub fn unique_junction_codes(gates: &[Gate]) -> Vec<StationCode> {
    let mut seen = HashSet::new();
    gates
        .iter()
        .flat_map(|g| [&g.junctions.before, &g.junctions.after])
        .filter_map(|j| j.as_ref().map(|j| j.code))
        .filter(|code| seen.insert(*code))
        .collect()
}

fn describe(station: Option<&StationRef>) -> String {
    match station {
        Some(s) => format!("{} ({})", s.name, s.code),
        None => "-".to_string(),
    }
}

fn log_gate_report(gate: &Gate, result: &GateResult) {
    info!(
        gate = %gate.gate_id,
        nearest = %describe(gate.nearest_station.as_ref()),
        adjacent = %format!(
            "{} - {}",
            describe(gate.adjacent_stations.before.as_ref()),
            describe(gate.adjacent_stations.after.as_ref())
        ),
        junctions = %format!(
            "{} - {}",
            describe(gate.junctions.before.as_ref()),
            describe(gate.junctions.after.as_ref())
        ),
        trains = result.live_trains.len(),
        status = %result.gate_status,
        "gate report"
    );

    for t in &result.live_trains {
        let s = &t.schedule;
        let pair = |arr: Option<ScheduleTime>, dep: Option<ClockTime>| {
            format!(
                "{}/{}",
                arr.map(|a| a.to_string()).unwrap_or_default(),
                dep.map(|d| d.to_string()).unwrap_or_default()
            )
        };
        info!(
            gate = %gate.gate_id,
            train = %t.train_number,
            name = %t.train_name,
            j1 = %pair(s.arrival_at_j1, s.departure_at_j1),
            j2 = %pair(s.arrival_at_j2, s.departure_at_j2),
            gate_passage = %s.gate_passage.map(|p| p.to_string()).unwrap_or_default(),
            "train passing gate"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::domain::{
        Coordinate, Direction, GateJunctions, GateStatus, ObservationMetadata, Schedule,
        TrainNumber, TrainObservation, TrainRoute,
    };
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Shared record of what the fake collector was asked to do.
    #[derive(Default, Clone)]
    struct Recorder {
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
        fetches: Arc<Mutex<Vec<StationCode>>>,
    }

    impl Recorder {
        fn fetched(&self) -> Vec<String> {
            self.fetches
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.to_string())
                .collect()
        }
    }

    #[derive(Default)]
    struct FakeSource {
        boards: HashMap<StationCode, Vec<TrainObservation>>,
        failing: HashSet<StationCode>,
        session_fails: bool,
        rec: Recorder,
    }

    struct FakeSession {
        boards: HashMap<StationCode, Vec<TrainObservation>>,
        failing: HashSet<StationCode>,
        rec: Recorder,
    }

    impl LiveTrainSource for FakeSource {
        type Session = FakeSession;

        async fn open_session(&self) -> Result<FakeSession, CollectorError> {
            if self.session_fails {
                return Err(CollectorError::Session("browser unavailable".into()));
            }
            self.rec.opened.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSession {
                boards: self.boards.clone(),
                failing: self.failing.clone(),
                rec: self.rec.clone(),
            })
        }
    }

    impl LiveTrainSession for FakeSession {
        async fn fetch(
            &self,
            station: StationCode,
            _now: NaiveDateTime,
        ) -> Result<Vec<TrainObservation>, CollectorError> {
            self.rec.fetches.lock().unwrap().push(station);
            if self.failing.contains(&station) {
                return Err(CollectorError::ElementNotFound {
                    station: station.to_string(),
                    element: "results table",
                    attempts: 2,
                });
            }
            Ok(self.boards.get(&station).cloned().unwrap_or_default())
        }

        async fn close(self) {
            self.rec.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn code(s: &str) -> StationCode {
        StationCode::parse(s).unwrap()
    }

    fn junction(c: &str, lon: f64) -> StationRef {
        StationRef {
            name: format!("{c} Jn"),
            code: code(c),
            position: Some(Coordinate::new(0.0, lon)),
        }
    }

    fn gate(id: u64, j1: &str, j2: &str) -> Gate {
        let lon = |c: &str| match c {
            "QLN" => 0.0,
            "KYJ" => 10.0,
            _ => 20.0,
        };
        Gate {
            gate_id: GateId::from(id),
            position: Coordinate::new(0.0, (lon(j1) + lon(j2)) / 2.0),
            route: Some("test route".into()),
            nearest_station: None,
            adjacent_stations: Default::default(),
            junctions: GateJunctions {
                before: Some(junction(j1, lon(j1))),
                after: Some(junction(j2, lon(j2))),
            },
        }
    }

    fn obs(number: &str, station: &str, dep: &str) -> TrainObservation {
        TrainObservation {
            train_number: TrainNumber::parse(number).unwrap(),
            train_name: "Venad Express".into(),
            route: TrainRoute::parse("TVC-SRR").unwrap(),
            schedule: Schedule {
                arrival: ScheduleTime::Unknown,
                departure: ScheduleTime::At(ClockTime::parse_hhmm(dep).unwrap()),
                ..Default::default()
            },
            metadata: ObservationMetadata {
                queried_station: code(station),
                last_updated: "2024-03-15T09:30:00Z".into(),
            },
            direction: Direction::default(),
        }
    }

    fn source() -> FakeSource {
        let mut boards = HashMap::new();
        boards.insert(code("QLN"), vec![obs("16302", "QLN", "10:00")]);
        boards.insert(code("KYJ"), vec![obs("16302", "KYJ", "11:00")]);
        boards.insert(code("ERS"), vec![]);
        FakeSource {
            boards,
            ..Default::default()
        }
    }

    fn ids(outcomes: &[GateOutcome]) -> Vec<GateId> {
        outcomes.iter().map(|o| o.result.gate_id.clone()).collect()
    }

    fn statuses(outcomes: &[GateOutcome]) -> Vec<GateStatus> {
        outcomes.iter().map(|o| o.result.gate_status).collect()
    }

    #[tokio::test]
    async fn shared_junction_fetched_once() {
        let src = source();
        let rec = src.rec.clone();
        let orch = Orchestrator::new(src, Correlator::default());

        let results = orch
            .process_batch(vec![gate(1, "QLN", "KYJ"), gate(2, "QLN", "ERS")], None, now())
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(rec.fetched(), vec!["QLN", "KYJ", "ERS"]);
        assert_eq!(rec.opened.load(Ordering::SeqCst), 1);
        assert_eq!(rec.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn verdicts_follow_correlation() {
        let orch = Orchestrator::new(source(), Correlator::default());
        let results = orch
            .process_batch(vec![gate(1, "QLN", "KYJ"), gate(2, "QLN", "ERS")], None, now())
            .await;

        assert_eq!(results[0].result.gate_status, GateStatus::Closed);
        assert_eq!(
            results[0].result.live_trains[0].schedule.gate_passage,
            ClockTime::from_hm(10, 30)
        );
        assert_eq!(results[1].result.gate_status, GateStatus::Open);
    }

    #[tokio::test]
    async fn selected_gate_comes_first() {
        let orch = Orchestrator::new(source(), Correlator::default());
        let gates = vec![
            gate(1, "QLN", "KYJ"),
            gate(2, "QLN", "KYJ"),
            gate(3, "QLN", "KYJ"),
        ];

        let results = orch
            .process_batch(gates, Some(&GateId::from(3u64)), now())
            .await;
        assert_eq!(
            ids(&results),
            vec![GateId::from(3u64), GateId::from(1u64), GateId::from(2u64)]
        );
    }

    #[tokio::test]
    async fn unknown_selected_gate_keeps_order() {
        let orch = Orchestrator::new(source(), Correlator::default());
        let gates = vec![gate(1, "QLN", "KYJ"), gate(2, "QLN", "KYJ")];

        let results = orch
            .process_batch(gates, Some(&GateId::from(99u64)), now())
            .await;
        assert_eq!(ids(&results), vec![GateId::from(1u64), GateId::from(2u64)]);
    }

    #[tokio::test]
    async fn session_failure_makes_every_gate_unknown() {
        let src = FakeSource {
            session_fails: true,
            ..source()
        };
        let rec = src.rec.clone();
        let orch = Orchestrator::new(src, Correlator::default());

        let results = orch
            .process_batch(vec![gate(1, "QLN", "KYJ"), gate(2, "QLN", "ERS")], None, now())
            .await;

        assert!(statuses(&results).iter().all(|s| *s == GateStatus::Unknown));
        assert!(results.iter().all(|o| o.result.live_trains.is_empty()));
        assert!(rec.fetched().is_empty());
    }

    #[tokio::test]
    async fn failed_junction_degrades_to_empty_board() {
        let mut src = source();
        src.failing.insert(code("KYJ"));
        let rec = src.rec.clone();
        let orch = Orchestrator::new(src, Correlator::default());

        let results = orch
            .process_batch(vec![gate(1, "QLN", "KYJ")], None, now())
            .await;

        assert_eq!(results[0].result.gate_status, GateStatus::Open);
        assert_eq!(rec.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gate_without_junctions_is_unknown_and_batch_continues() {
        let orch = Orchestrator::new(source(), Correlator::default());
        let mut broken = gate(7, "QLN", "KYJ");
        broken.junctions = GateJunctions::default();

        let results = orch
            .process_batch(vec![broken, gate(1, "QLN", "KYJ")], None, now())
            .await;

        assert_eq!(results[0].result.gate_status, GateStatus::Unknown);
        assert_eq!(results[1].result.gate_status, GateStatus::Closed);
    }

    #[tokio::test]
    async fn cached_boards_skip_the_collector() {
        let src = source();
        let rec = src.rec.clone();
        let orch = Orchestrator::new(src, Correlator::default())
            .with_cache(BoardCache::new(&CacheConfig::default()));

        let first = orch
            .process_batch(vec![gate(1, "QLN", "KYJ")], None, now())
            .await;
        let second = orch
            .process_batch(vec![gate(1, "QLN", "KYJ")], None, now())
            .await;

        assert_eq!(first, second);
        assert_eq!(statuses(&first), vec![GateStatus::Closed]);
        assert_eq!(rec.fetched(), vec!["QLN", "KYJ"]);
        assert_eq!(rec.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let mut src = source();
        src.failing.insert(code("KYJ"));
        let rec = src.rec.clone();
        let orch = Orchestrator::new(src, Correlator::default())
            .with_cache(BoardCache::new(&CacheConfig::default()));

        orch.process_batch(vec![gate(1, "QLN", "KYJ")], None, now())
            .await;
        orch.process_batch(vec![gate(1, "QLN", "KYJ")], None, now())
            .await;

        assert_eq!(rec.fetched(), vec!["QLN", "KYJ", "KYJ"]);
    }

    #[tokio::test]
    async fn concurrent_fetches_cover_every_junction_once() {
        let src = source();
        let rec = src.rec.clone();
        let orch = Orchestrator::new(src, Correlator::default()).with_fetch_concurrency(3);

        orch.process_batch(
            vec![gate(1, "QLN", "KYJ"), gate(2, "KYJ", "ERS")],
            None,
            now(),
        )
        .await;

        let mut fetched = rec.fetched();
        fetched.sort();
        assert_eq!(fetched, vec!["ERS", "KYJ", "QLN"]);
    }

    #[test]
    fn unique_codes_in_first_seen_order() {
        let gates = vec![
            gate(1, "QLN", "KYJ"),
            gate(2, "KYJ", "ERS"),
            gate(3, "QLN", "ERS"),
        ];
        let codes: Vec<_> = unique_junction_codes(&gates)
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(codes, vec!["QLN", "KYJ", "ERS"]);
    }
}
