//! Shared test doubles.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::Semaphore;

use crate::domain::{Arrival, Line, LineId, LiveDelayRecord, StopId};
use crate::remote::{RemoteError, RemoteSource};

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    date().and_hms_opt(h, m, 0).unwrap()
}

pub fn tod(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn line(id: u32) -> Line {
    Line::new(LineId(id), id.to_string(), None)
}

pub fn arrival(line_id: u32, h: u32, m: u32) -> Arrival {
    Arrival::new(line(line_id), at(h, m), format!("towards {line_id}"))
}

pub fn record(line_id: u32, h: u32, m: u32, delay: Option<i32>) -> LiveDelayRecord {
    LiveDelayRecord::new(LineId(line_id), tod(h, m), delay)
}

pub fn stop() -> StopId {
    StopId::parse("1042").unwrap()
}

/// Which error a scripted call should fail with.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NoNetwork,
    Unexpected,
}

impl Failure {
    fn to_error(self) -> RemoteError {
        match self {
            Failure::NoNetwork => RemoteError::NoNetwork {
                message: "offline".into(),
            },
            Failure::Unexpected => RemoteError::Api {
                status: 500,
                message: "boom".into(),
            },
        }
    }
}

/// One scripted live poll result.
#[derive(Debug, Clone)]
pub enum LiveStep {
    Records(Vec<LiveDelayRecord>),
    Fail(Failure),
    /// Never returns.
    Hang,
}

/// In-memory remote with call counters, scripted failures and gates.
#[derive(Default)]
pub struct FakeRemote {
    lines: Mutex<Vec<Line>>,
    lines_failure: Mutex<Option<Failure>>,
    lines_gate: Option<Arc<Semaphore>>,
    line_fetches: AtomicUsize,

    live_script: Mutex<VecDeque<LiveStep>>,
    live_default: Mutex<Vec<LiveDelayRecord>>,
    live_gate: Option<Arc<Semaphore>>,
    live_fetches: AtomicUsize,

    arrivals: Mutex<HashMap<StopId, Vec<Arrival>>>,
    arrival_fetches: AtomicUsize,
}

impl FakeRemote {
    pub fn with_lines(lines: Vec<Line>) -> Self {
        Self {
            lines: Mutex::new(lines),
            ..Default::default()
        }
    }

    /// Line fetches wait for a permit on the returned semaphore.
    pub fn gate_lines(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.lines_gate = Some(gate.clone());
        (self, gate)
    }

    /// Live fetches wait for a permit on the returned semaphore.
    pub fn gate_live(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.live_gate = Some(gate.clone());
        (self, gate)
    }

    pub fn set_lines(&self, lines: Vec<Line>) {
        *self.lines.lock().unwrap() = lines;
    }

    pub fn fail_lines(&self, failure: Option<Failure>) {
        *self.lines_failure.lock().unwrap() = failure;
    }

    pub fn set_live(&self, records: Vec<LiveDelayRecord>) {
        *self.live_default.lock().unwrap() = records;
    }

    pub fn script_live(&self, steps: impl IntoIterator<Item = LiveStep>) {
        self.live_script.lock().unwrap().extend(steps);
    }

    pub fn set_arrivals(&self, stop: StopId, arrivals: Vec<Arrival>) {
        self.arrivals.lock().unwrap().insert(stop, arrivals);
    }

    pub fn line_fetches(&self) -> usize {
        self.line_fetches.load(Ordering::SeqCst)
    }

    pub fn live_fetches(&self) -> usize {
        self.live_fetches.load(Ordering::SeqCst)
    }

    pub fn arrival_fetches(&self) -> usize {
        self.arrival_fetches.load(Ordering::SeqCst)
    }
}

impl RemoteSource for FakeRemote {
    async fn fetch_lines(&self) -> Result<Vec<Line>, RemoteError> {
        self.line_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.lines_gate {
            gate.acquire().await.unwrap().forget();
        }
        if let Some(failure) = *self.lines_failure.lock().unwrap() {
            return Err(failure.to_error());
        }
        Ok(self.lines.lock().unwrap().clone())
    }

    async fn fetch_live_delays(&self, _stop: &StopId) -> Result<Vec<LiveDelayRecord>, RemoteError> {
        self.live_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.live_gate {
            gate.acquire().await.unwrap().forget();
        }
        let step = self.live_script.lock().unwrap().pop_front();
        match step {
            Some(LiveStep::Records(records)) => Ok(records),
            Some(LiveStep::Fail(failure)) => Err(failure.to_error()),
            Some(LiveStep::Hang) => std::future::pending().await,
            None => Ok(self.live_default.lock().unwrap().clone()),
        }
    }

    async fn fetch_arrivals(
        &self,
        stop: &StopId,
        _date: NaiveDate,
    ) -> Result<Vec<Arrival>, RemoteError> {
        self.arrival_fetches.fetch_add(1, Ordering::SeqCst);
        self.arrivals
            .lock()
            .unwrap()
            .get(stop)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(stop.to_string()))
    }
}
