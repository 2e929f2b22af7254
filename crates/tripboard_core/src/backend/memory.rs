//! In-process backend.
//!
//! Clones share the same store, so a test can keep a handle to inject
//! failures while a worker thread owns another clone.

use std::sync::{Arc, Mutex, MutexGuard};

use jiff::Timestamp;

use super::{Backend, stored_point};
use crate::error::BackendError;
use crate::model::{
    Catalog, Destination, OfferGroup, Point, PointId, PointWire, parse_points,
};

const SAMPLE_POINTS: &str = include_str!("../../assets/seed/points.json");

#[derive(Debug, Default)]
struct MemoryState {
    points: Vec<PointWire>,
    catalog: Catalog,
    fail_next: Option<String>,
    failing: bool,
    writes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new(points: Vec<Point>, catalog: Catalog) -> Self {
        let state = MemoryState {
            points: points.iter().map(Point::to_wire).collect(),
            catalog,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Store preloaded with the bundled sample trip and catalog
    pub fn sample() -> Result<Self, BackendError> {
        let records: Vec<serde_json::Value> = serde_json::from_str(SAMPLE_POINTS)
            .map_err(|e| BackendError::Parse(format!("bundled points: {e}")))?;
        Ok(Self::new(parse_points(records), Catalog::bundled()?))
    }

    /// Make the next write fail with `message`
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    /// Make every write fail until switched off
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of write requests received, failed ones included
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    pub fn snapshot(&self) -> Vec<PointWire> {
        self.lock().points.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not wedge the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_write(&self) -> Result<MutexGuard<'_, MemoryState>, BackendError> {
        let mut state = self.lock();
        state.writes += 1;
        if let Some(message) = state.fail_next.take() {
            return Err(BackendError::Injected(message));
        }
        if state.failing {
            return Err(BackendError::Injected("backend unavailable".into()));
        }
        Ok(state)
    }
}

impl Backend for MemoryBackend {
    fn load_points(&self) -> Result<Vec<Point>, BackendError> {
        self.lock()
            .points
            .iter()
            .cloned()
            .map(stored_point)
            .collect()
    }

    fn load_destinations(&self) -> Result<Vec<Destination>, BackendError> {
        Ok(self.lock().catalog.destinations.clone())
    }

    fn load_offers(&self) -> Result<Vec<OfferGroup>, BackendError> {
        Ok(self.lock().catalog.offers.clone())
    }

    fn create_point(&self, point: &PointWire) -> Result<Point, BackendError> {
        let mut state = self.begin_write()?;
        let mut stored = point.clone();
        if stored.id.as_str().is_empty() {
            stored.id = PointId::generate(Timestamp::now());
        }
        if state.points.iter().any(|p| p.id == stored.id) {
            return Err(BackendError::Conflict(stored.id));
        }
        state.points.push(stored.clone());
        stored_point(stored)
    }

    fn update_point(&self, id: &PointId, point: &PointWire) -> Result<Point, BackendError> {
        let mut state = self.begin_write()?;
        let slot = state
            .points
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| BackendError::NotFound(id.clone()))?;
        let mut stored = point.clone();
        stored.id = id.clone();
        *slot = stored.clone();
        stored_point(stored)
    }

    fn delete_point(&self, id: &PointId) -> Result<(), BackendError> {
        let mut state = self.begin_write()?;
        let before = state.points.len();
        state.points.retain(|p| &p.id != id);
        if state.points.len() == before {
            return Err(BackendError::NotFound(id.clone()));
        }
        Ok(())
    }
}
