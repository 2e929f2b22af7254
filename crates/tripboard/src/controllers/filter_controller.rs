//! Owns the filter bar and keeps it in step with the collection.
//!
//! A filter with no matching points is disabled; activating it does
//! nothing. While a draft is being added every filter is disabled.

use std::sync::mpsc::Receiver;

use jiff::Timestamp;
use tripboard_core::{CollectionChange, EventsCollection, FilterType};

use crate::components::filter_bar::FilterBar;

pub struct FilterController {
    bar: FilterBar,
    changes: Receiver<CollectionChange>,
    all_disabled: bool,
}

impl FilterController {
    pub fn new(collection: &mut EventsCollection, now: Timestamp) -> Self {
        let mut controller = Self {
            bar: FilterBar::default(),
            changes: collection.subscribe(),
            all_disabled: false,
        };
        controller.render(collection, now);
        controller
    }

    pub fn bar(&self) -> &FilterBar {
        &self.bar
    }

    pub fn is_disabled(&self, filter: FilterType) -> bool {
        self.bar.is_disabled(filter)
    }

    /// Recompute which filters have points.
    pub fn render(&mut self, collection: &EventsCollection, now: Timestamp) {
        self.bar.set_active(collection.filter());
        for filter in FilterType::ALL {
            let empty = collection.count(filter, now) == 0;
            self.bar.set_disabled(filter, self.all_disabled || empty);
        }
    }

    /// Drain collection notifications. Returns true if anything changed.
    pub fn poll(&mut self, collection: &EventsCollection, now: Timestamp) -> bool {
        let changed = self.changes.try_iter().count() > 0;
        if changed {
            self.render(collection, now);
        }
        changed
    }

    /// User picked a filter. Returns true when it was applied.
    pub fn activate(
        &mut self,
        filter: FilterType,
        collection: &mut EventsCollection,
        now: Timestamp,
    ) -> bool {
        let allowed = filter == FilterType::Everything
            || (!self.all_disabled && collection.count(filter, now) > 0);
        if !allowed || self.all_disabled {
            tracing::debug!(filter = filter.name(), "Filter activation ignored");
            return false;
        }
        if collection.filter() != filter {
            collection.set_filter(filter);
        }
        self.render(collection, now);
        true
    }

    pub fn set_default_filter(&mut self, collection: &mut EventsCollection, now: Timestamp) {
        if collection.filter() != FilterType::Everything {
            collection.set_filter(FilterType::Everything);
        }
        self.render(collection, now);
    }

    pub fn disable_all(&mut self, collection: &EventsCollection, now: Timestamp) {
        self.all_disabled = true;
        self.render(collection, now);
    }

    pub fn enable_all(&mut self, collection: &EventsCollection, now: Timestamp) {
        self.all_disabled = false;
        self.render(collection, now);
    }

    pub fn set_create_enabled(&mut self, enabled: bool) {
        self.bar.set_create_enabled(enabled);
    }
}
