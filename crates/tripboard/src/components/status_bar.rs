use jiff::tz::TimeZone;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tripboard_core::Point;

use super::{Component, RenderContext};
use crate::config::KeybindingsConfig;
use crate::util::format::{format_price, trip_dates, trip_route};
use crate::util::styles::{ERROR_COLOR, HELP_COLOR};

/// Route, dates and cost of the whole trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSummary {
    pub route: String,
    pub dates: String,
    pub total: u64,
}

impl TripSummary {
    /// Summary of every point, in chronological order. `None` for an empty trip.
    pub fn from_points(points: &[Point], tz: &TimeZone) -> Option<Self> {
        let mut sorted: Vec<&Point> = points.iter().collect();
        sorted.sort_by_key(|p| p.start_date);
        let first = sorted.first()?;
        let last_end = sorted.iter().map(|p| p.end_date).max()?;

        Some(Self {
            route: trip_route(sorted.iter().map(|p| p.destination.name.as_str())),
            dates: trip_dates(first.start_date, last_end, tz),
            total: sorted.iter().map(|p| p.total_price()).sum(),
        })
    }
}

#[derive(Debug, Default)]
pub struct StatusBar {
    summary: Option<TripSummary>,
    error: Option<String>,
}

impl StatusBar {
    pub fn set_summary(&mut self, summary: Option<TripSummary>) {
        self.summary = summary;
    }

    pub fn summary(&self) -> Option<&TripSummary> {
        self.summary.as_ref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn help_text(keys: &KeybindingsConfig) -> String {
        let hint = KeybindingsConfig::hint;
        format!(
            "j/k: navigate | {}: edit | {}: new | {}/{}/{}: filter | {}: quit",
            hint(&keys.navigation.confirm),
            hint(&keys.global.new_point),
            hint(&keys.global.filter_everything),
            hint(&keys.global.filter_future),
            hint(&keys.global.filter_past),
            hint(&keys.global.quit),
        )
    }
}

impl Component for StatusBar {
    fn height(&self) -> u16 {
        3
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let trip = match &self.summary {
            Some(summary) => Line::from(vec![
                Span::styled(
                    summary.route.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}  ", summary.dates)),
                Span::styled(
                    format!("Total: {}", format_price(summary.total)),
                    Style::default().fg(Color::Green),
                ),
            ]),
            None => Line::from(Span::styled(
                "No points yet",
                Style::default().fg(HELP_COLOR),
            )),
        };

        let second = if let Some(error) = &self.error {
            Line::from(vec![
                Span::styled("Error: ", Style::default().fg(ERROR_COLOR)),
                Span::raw(error.clone()),
            ])
        } else {
            Line::from(Span::styled(
                Self::help_text(ctx.keys),
                Style::default().fg(HELP_COLOR),
            ))
        };

        let paragraph =
            Paragraph::new(vec![trip, second]).block(Block::default().borders(Borders::TOP));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripboard_core::{Destination, Offer, PointId, PointType};

    fn point(city: &str, start: &str, end: &str, price: u32) -> Point {
        Point {
            id: PointId::from(city),
            point_type: PointType::Train,
            destination: Destination {
                name: city.into(),
                ..Destination::default()
            },
            price,
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            offers: vec![Offer {
                title: "Book tickets".into(),
                price: 5,
            }],
            is_favorite: false,
        }
    }

    #[test]
    fn test_summary_is_chronological() {
        let points = vec![
            point("Geneva", "2019-03-19T10:00:00Z", "2019-03-19T12:00:00Z", 100),
            point("Amsterdam", "2019-03-18T10:00:00Z", "2019-03-18T12:00:00Z", 20),
        ];
        let summary = TripSummary::from_points(&points, &TimeZone::UTC).unwrap();
        assert_eq!(summary.route, "Amsterdam - Geneva");
        assert_eq!(summary.dates, "MAR 18 - 19");
        assert_eq!(summary.total, 130);
    }

    #[test]
    fn test_empty_trip_has_no_summary() {
        assert!(TripSummary::from_points(&[], &TimeZone::UTC).is_none());
    }
}
