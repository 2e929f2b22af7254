//! Trip planning core library
//!
//! UI-independent building blocks of the trip planner:
//! - Trip points, their wire format and client-side ids
//! - Destination and offer catalogs
//! - The events collection with its Everything/Future/Past filters
//! - Form date parsing and formatting
//! - Persistence backends (local files, in-memory, remote API)

#![warn(clippy::all)]

pub mod backend;
pub mod collection;
pub mod dates;
pub mod error;
pub mod filter;
pub mod io;
pub mod model;

#[cfg(test)]
mod tests;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use collection::{CollectionChange, EventsCollection};
pub use error::{BackendError, DateError, PointError};
pub use filter::FilterType;
pub use model::{
    Catalog, Destination, Offer, OfferGroup, Picture, Point, PointId, PointType, PointWire,
};
