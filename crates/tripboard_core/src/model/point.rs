//! Trip points and their wire representation
//!
//! A [`Point`] is one entry of the trip: a transport leg or an activity at a
//! destination. [`PointWire`] is the JSON shape exchanged with backends.

use jiff::{RoundMode, Timestamp, TimestampRound, Unit};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::ids::PointId;
use crate::error::PointError;

/// Category of a trip point.
///
/// Transfers move the traveller somewhere ("Bus to Geneva"), activities
/// happen at a place ("Sightseeing in Geneva").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointType {
    Taxi,
    Bus,
    Train,
    Ship,
    Transport,
    Drive,
    Flight,
    CheckIn,
    Sightseeing,
    Restaurant,
}

impl PointType {
    pub const TRANSFERS: [PointType; 7] = [
        PointType::Taxi,
        PointType::Bus,
        PointType::Train,
        PointType::Ship,
        PointType::Transport,
        PointType::Drive,
        PointType::Flight,
    ];

    pub const ACTIVITIES: [PointType; 3] = [
        PointType::CheckIn,
        PointType::Sightseeing,
        PointType::Restaurant,
    ];

    pub const ALL: [PointType; 10] = [
        PointType::Taxi,
        PointType::Bus,
        PointType::Train,
        PointType::Ship,
        PointType::Transport,
        PointType::Drive,
        PointType::Flight,
        PointType::CheckIn,
        PointType::Sightseeing,
        PointType::Restaurant,
    ];

    pub fn is_transfer(&self) -> bool {
        !matches!(
            self,
            PointType::CheckIn | PointType::Sightseeing | PointType::Restaurant
        )
    }

    /// Display name as shown in the type selector
    pub fn label(&self) -> &'static str {
        match self {
            PointType::Taxi => "Taxi",
            PointType::Bus => "Bus",
            PointType::Train => "Train",
            PointType::Ship => "Ship",
            PointType::Transport => "Transport",
            PointType::Drive => "Drive",
            PointType::Flight => "Flight",
            PointType::CheckIn => "Check-in",
            PointType::Sightseeing => "Sightseeing",
            PointType::Restaurant => "Restaurant",
        }
    }

    /// "to" for transfers, "in" for activities
    pub fn preposition(&self) -> &'static str {
        if self.is_transfer() { "to" } else { "in" }
    }

    /// Heading used on cards and forms, e.g. "Bus to" or "Check-in in"
    pub fn heading(&self) -> String {
        format!("{} {}", self.label(), self.preposition())
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub src: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

/// Paid add-on attached to a point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub title: String,
    pub price: u32,
}

/// JSON record as exchanged with a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointWire {
    #[serde(default)]
    pub id: PointId,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub destination: Destination,
    pub base_price: u32,
    pub date_from: String,
    pub date_to: String,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// A single trip event held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub id: PointId,
    pub point_type: PointType,
    pub destination: Destination,
    pub price: u32,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// Accepted offers, unique by title
    pub offers: Vec<Offer>,
    pub is_favorite: bool,
}

impl Point {
    /// Convert a wire record. Dates must be RFC 3339 timestamps.
    pub fn from_wire(wire: PointWire) -> Result<Self, PointError> {
        let start_date = parse_wire_date("date_from", &wire.date_from)?;
        let end_date = parse_wire_date("date_to", &wire.date_to)?;

        Ok(Self {
            id: wire.id,
            point_type: wire.point_type,
            destination: wire.destination,
            price: wire.base_price,
            start_date,
            end_date,
            offers: dedup_offers(wire.offers),
            is_favorite: wire.is_favorite,
        })
    }

    pub fn to_wire(&self) -> PointWire {
        PointWire {
            id: self.id.clone(),
            point_type: self.point_type,
            destination: self.destination.clone(),
            base_price: self.price,
            date_from: self.start_date.to_string(),
            date_to: self.end_date.to_string(),
            offers: self.offers.clone(),
            is_favorite: self.is_favorite,
        }
    }

    /// Template for a point that is being added: a bus ride with no
    /// destination, starting and ending at the current minute.
    pub fn empty(now: Timestamp) -> Self {
        let minute = TimestampRound::new()
            .smallest(Unit::Minute)
            .mode(RoundMode::Trunc);
        let now = now.round(minute).unwrap_or(now);
        Self {
            id: PointId::default(),
            point_type: PointType::Bus,
            destination: Destination::default(),
            price: 0,
            start_date: now,
            end_date: now,
            offers: Vec::new(),
            is_favorite: false,
        }
    }

    pub fn is_future(&self, now: Timestamp) -> bool {
        self.start_date > now
    }

    pub fn is_past(&self, now: Timestamp) -> bool {
        self.end_date < now
    }

    pub fn has_offer(&self, title: &str) -> bool {
        self.offers.iter().any(|o| o.title == title)
    }

    /// Base price plus all accepted offers
    pub fn total_price(&self) -> u64 {
        u64::from(self.price) + self.offers.iter().map(|o| u64::from(o.price)).sum::<u64>()
    }
}

/// Decode raw JSON records, skipping the ones that do not convert.
pub fn parse_points(records: Vec<serde_json::Value>) -> Vec<Point> {
    records
        .into_iter()
        .filter_map(|record| {
            let converted = serde_json::from_value::<PointWire>(record)
                .map_err(|e| PointError::Malformed(e.to_string()))
                .and_then(Point::from_wire);
            match converted {
                Ok(point) => Some(point),
                Err(e) => {
                    tracing::warn!("Skipping point record: {e}");
                    None
                }
            }
        })
        .collect()
}

fn parse_wire_date(field: &'static str, value: &str) -> Result<Timestamp, PointError> {
    value.parse::<Timestamp>().map_err(|_| PointError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn dedup_offers(offers: Vec<Offer>) -> Vec<Offer> {
    let mut seen = FxHashSet::default();
    offers
        .into_iter()
        .filter(|offer| seen.insert(offer.title.clone()))
        .collect()
}
