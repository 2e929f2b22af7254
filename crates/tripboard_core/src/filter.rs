use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::model::Point;

/// Mutually exclusive list views over the trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Everything,
    Future,
    Past,
}

impl FilterType {
    pub const ALL: [FilterType; 3] = [FilterType::Everything, FilterType::Future, FilterType::Past];

    pub fn name(&self) -> &'static str {
        match self {
            FilterType::Everything => "Everything",
            FilterType::Future => "Future",
            FilterType::Past => "Past",
        }
    }

    pub fn matches(&self, point: &Point, now: Timestamp) -> bool {
        match self {
            FilterType::Everything => true,
            FilterType::Future => point.is_future(now),
            FilterType::Past => point.is_past(now),
        }
    }

    /// Points passing this filter, order preserved
    pub fn apply<'a>(&self, points: &'a [Point], now: Timestamp) -> Vec<&'a Point> {
        points.iter().filter(|p| self.matches(p, now)).collect()
    }
}
