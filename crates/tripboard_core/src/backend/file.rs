//! File-based backend
//!
//! Directory structure:
//! ~/.tripboard/
//!   points.json          # Trip points in wire format
//!   destinations.json    # Known destinations
//!   offers.json          # Offers per point type

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Backend, stored_point};
use crate::error::BackendError;
use crate::io::atomic_write;
use crate::model::{Destination, OfferGroup, Point, PointId, PointWire, parse_points};

const SEED_POINTS: &str = include_str!("../../assets/seed/points.json");
const SEED_DESTINATIONS: &str = include_str!("../../assets/seed/destinations.json");
const SEED_OFFERS: &str = include_str!("../../assets/seed/offers.json");

pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn points_path(&self) -> PathBuf {
        self.root.join("points.json")
    }

    fn destinations_path(&self) -> PathBuf {
        self.root.join("destinations.json")
    }

    fn offers_path(&self) -> PathBuf {
        self.root.join("offers.json")
    }

    pub fn exists(&self) -> bool {
        self.points_path().exists()
    }

    /// Create the directory and any missing data files. Catalog files are
    /// always seeded from the bundled sample; `with_sample_trip` also seeds
    /// a few points instead of an empty trip.
    pub fn init(&self, with_sample_trip: bool) -> Result<(), BackendError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| BackendError::Io(format!("Failed to create data directory: {e}")))?;

        let points_seed = if with_sample_trip { SEED_POINTS } else { "[]" };
        for (path, seed) in [
            (self.points_path(), points_seed),
            (self.destinations_path(), SEED_DESTINATIONS),
            (self.offers_path(), SEED_OFFERS),
        ] {
            if !path.exists() {
                atomic_write(&path, seed)
                    .map_err(|e| BackendError::Io(format!("Failed to seed {path:?}: {e}")))?;
                tracing::debug!("Seeded {}", path.display());
            }
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, BackendError> {
        let content = fs::read_to_string(path)
            .map_err(|e| BackendError::Io(format!("Failed to read {path:?}: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| BackendError::Parse(format!("Failed to parse {path:?}: {e}")))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), BackendError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| BackendError::Serialize(format!("Failed to serialize {path:?}: {e}")))?;
        atomic_write(path, &json)
            .map_err(|e| BackendError::Io(format!("Failed to write {path:?}: {e}")))
    }

    /// Raw records, so that entries we cannot decode survive a rewrite.
    fn read_records(&self) -> Result<Vec<serde_json::Value>, BackendError> {
        let path = self.points_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        self.read_json(&path)
    }

    fn encode(point: &PointWire) -> Result<serde_json::Value, BackendError> {
        serde_json::to_value(point).map_err(|e| BackendError::Serialize(e.to_string()))
    }
}

fn record_id(record: &serde_json::Value) -> Option<&str> {
    record.get("id").and_then(|id| id.as_str())
}

impl Backend for FileBackend {
    fn load_points(&self) -> Result<Vec<Point>, BackendError> {
        Ok(parse_points(self.read_records()?))
    }

    fn load_destinations(&self) -> Result<Vec<Destination>, BackendError> {
        self.read_json(&self.destinations_path())
    }

    fn load_offers(&self) -> Result<Vec<OfferGroup>, BackendError> {
        self.read_json(&self.offers_path())
    }

    fn create_point(&self, point: &PointWire) -> Result<Point, BackendError> {
        let mut records = self.read_records()?;

        let mut stored = point.clone();
        if stored.id.as_str().is_empty() {
            stored.id = PointId::generate(Timestamp::now());
        }
        if records
            .iter()
            .any(|r| record_id(r) == Some(stored.id.as_str()))
        {
            return Err(BackendError::Conflict(stored.id));
        }

        records.push(Self::encode(&stored)?);
        self.write_json(&self.points_path(), &records)?;
        stored_point(stored)
    }

    fn update_point(&self, id: &PointId, point: &PointWire) -> Result<Point, BackendError> {
        let mut records = self.read_records()?;
        let slot = records
            .iter_mut()
            .find(|r| record_id(r) == Some(id.as_str()))
            .ok_or_else(|| BackendError::NotFound(id.clone()))?;

        let mut stored = point.clone();
        stored.id = id.clone();
        *slot = Self::encode(&stored)?;
        self.write_json(&self.points_path(), &records)?;
        stored_point(stored)
    }

    fn delete_point(&self, id: &PointId) -> Result<(), BackendError> {
        let mut records = self.read_records()?;
        let before = records.len();
        records.retain(|r| record_id(r) != Some(id.as_str()));
        if records.len() == before {
            return Err(BackendError::NotFound(id.clone()));
        }
        self.write_json(&self.points_path(), &records)
    }
}
