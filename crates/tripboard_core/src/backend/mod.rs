//! Persistence collaborators.
//!
//! [`Backend`] abstracts where points and catalogs live:
//! - [`FileBackend`]: JSON files in a local data directory
//! - [`MemoryBackend`]: in-process store with failure injection
//! - [`ApiBackend`]: remote CRUD HTTP API (feature `api`)
//!
//! Every write returns the canonical point as the backend stored it.

#[cfg(feature = "api")]
mod api;
mod file;
mod memory;

#[cfg(feature = "api")]
pub use api::ApiBackend;
pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::BackendError;
use crate::model::{Catalog, Destination, OfferGroup, Point, PointId, PointWire};

pub trait Backend: Send {
    fn load_points(&self) -> Result<Vec<Point>, BackendError>;

    fn load_destinations(&self) -> Result<Vec<Destination>, BackendError>;

    fn load_offers(&self) -> Result<Vec<OfferGroup>, BackendError>;

    /// Store a new point. The backend may assign a different id.
    fn create_point(&self, point: &PointWire) -> Result<Point, BackendError>;

    fn update_point(&self, id: &PointId, point: &PointWire) -> Result<Point, BackendError>;

    fn delete_point(&self, id: &PointId) -> Result<(), BackendError>;

    fn load_catalog(&self) -> Result<Catalog, BackendError> {
        Ok(Catalog::new(self.load_destinations()?, self.load_offers()?))
    }
}

/// Convert a record coming back from storage into a point.
fn stored_point(wire: PointWire) -> Result<Point, BackendError> {
    Point::from_wire(wire).map_err(|e| BackendError::Parse(e.to_string()))
}
