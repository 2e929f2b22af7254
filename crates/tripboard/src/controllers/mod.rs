pub mod event_controller;
pub mod filter_controller;
pub mod trip_controller;

pub use event_controller::{ControllerEvent, DataChange, EventController, Mode};
pub use filter_controller::FilterController;
pub use trip_controller::TripController;

use std::time::Instant;

use jiff::Timestamp;

/// Wall clock time for date logic plus monotonic time for UI timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub wall: Timestamp,
    pub mono: Instant,
}

impl Moment {
    pub fn now() -> Self {
        Self {
            wall: Timestamp::now(),
            mono: Instant::now(),
        }
    }
}
