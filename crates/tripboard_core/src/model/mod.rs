//! Trip data model
//!
//! - `ids`: point identifiers
//! - `point`: points, types, destinations, offers and the wire shape
//! - `catalog`: known destinations and per-type offers

mod catalog;
mod ids;
mod point;

pub use catalog::{Catalog, OfferGroup};
pub use ids::PointId;
pub use point::{Destination, Offer, Picture, Point, PointType, PointWire, parse_points};
