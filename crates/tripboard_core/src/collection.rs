//! In-memory set of trip points with an active filter.
//!
//! Observers subscribe once and receive a [`CollectionChange`] for every
//! mutation or filter switch. Filtered views are derived on demand.

use std::sync::mpsc::{Receiver, Sender, channel};

use jiff::Timestamp;

use crate::filter::FilterType;
use crate::model::{Point, PointId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
    Inserted(PointId),
    Updated(PointId),
    Removed(PointId),
    FilterChanged(FilterType),
}

#[derive(Debug, Default)]
pub struct EventsCollection {
    points: Vec<Point>,
    filter: FilterType,
    subscribers: Vec<Sender<CollectionChange>>,
}

impl EventsCollection {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            filter: FilterType::Everything,
            subscribers: Vec::new(),
        }
    }

    /// Register an observer. The receiver stays valid for the lifetime of
    /// the collection.
    pub fn subscribe(&mut self) -> Receiver<CollectionChange> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: &PointId) -> Option<&Point> {
        self.points.iter().find(|p| &p.id == id)
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterType) {
        self.filter = filter;
        self.notify(CollectionChange::FilterChanged(filter));
    }

    /// Points under the active filter
    pub fn filtered(&self, now: Timestamp) -> Vec<&Point> {
        self.filter.apply(&self.points, now)
    }

    pub fn count(&self, filter: FilterType, now: Timestamp) -> usize {
        self.points.iter().filter(|p| filter.matches(p, now)).count()
    }

    /// Append a point. Returns false when the id is already present.
    pub fn insert(&mut self, point: Point) -> bool {
        if self.get(&point.id).is_some() {
            return false;
        }
        let id = point.id.clone();
        self.points.push(point);
        self.notify(CollectionChange::Inserted(id));
        true
    }

    /// Replace the point with the same id in place.
    pub fn update(&mut self, point: Point) -> bool {
        let Some(slot) = self.points.iter_mut().find(|p| p.id == point.id) else {
            return false;
        };
        let id = point.id.clone();
        *slot = point;
        self.notify(CollectionChange::Updated(id));
        true
    }

    pub fn remove(&mut self, id: &PointId) -> Option<Point> {
        let index = self.points.iter().position(|p| &p.id == id)?;
        let removed = self.points.remove(index);
        self.notify(CollectionChange::Removed(id.clone()));
        Some(removed)
    }

    fn notify(&mut self, change: CollectionChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}
