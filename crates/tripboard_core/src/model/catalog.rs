//! Reference data consumed read-only by the edit form: known destinations
//! and the add-on offers available for each point type.

use serde::{Deserialize, Serialize};

use super::point::{Destination, Offer, PointType};
use crate::error::BackendError;

const SEED_DESTINATIONS: &str = include_str!("../../assets/seed/destinations.json");
const SEED_OFFERS: &str = include_str!("../../assets/seed/offers.json");

/// Offers available for one point type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferGroup {
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub destinations: Vec<Destination>,
    pub offers: Vec<OfferGroup>,
}

impl Catalog {
    pub fn new(destinations: Vec<Destination>, offers: Vec<OfferGroup>) -> Self {
        Self {
            destinations,
            offers,
        }
    }

    /// Sample catalog shipped with the crate
    pub fn bundled() -> Result<Self, BackendError> {
        let destinations = serde_json::from_str(SEED_DESTINATIONS)
            .map_err(|e| BackendError::Parse(format!("bundled destinations: {e}")))?;
        let offers = serde_json::from_str(SEED_OFFERS)
            .map_err(|e| BackendError::Parse(format!("bundled offers: {e}")))?;
        Ok(Self::new(destinations, offers))
    }

    pub fn destination(&self, name: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.name == name)
    }

    pub fn is_known_city(&self, name: &str) -> bool {
        !name.is_empty() && self.destination(name).is_some()
    }

    pub fn city_names(&self) -> impl Iterator<Item = &str> {
        self.destinations.iter().map(|d| d.name.as_str())
    }

    /// Offers for a type; empty when the catalog has none
    pub fn offers_for(&self, point_type: PointType) -> &[Offer] {
        self.offers
            .iter()
            .find(|group| group.point_type == point_type)
            .map(|group| group.offers.as_slice())
            .unwrap_or(&[])
    }
}
