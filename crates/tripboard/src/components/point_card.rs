//! Read-only card shown for a point while it is not being edited.

use jiff::tz::TimeZone;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tripboard_core::Point;
use tripboard_core::dates::duration_label;

use super::{Component, Rerender, RenderContext};
use crate::util::format::{clock_label, format_price};
use crate::util::styles::{FAVORITE_COLOR, FOCUS_COLOR, HELP_COLOR};

/// Offers listed on a card; the rest are only visible in the form
const MAX_CARD_OFFERS: usize = 3;

pub struct PointCard {
    point: Point,
    tz: TimeZone,
    lines: Vec<Line<'static>>,
}

impl PointCard {
    pub fn new(point: Point, tz: TimeZone) -> Self {
        let mut card = Self {
            point,
            tz,
            lines: Vec::new(),
        };
        card.rerender();
        card
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn set_point(&mut self, point: Point) {
        self.point = point;
        self.rerender();
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }
}

impl Rerender for PointCard {
    fn rerender(&mut self) {
        let point = &self.point;
        let star = if point.is_favorite { " ★" } else { "" };
        let title = Line::from(vec![
            Span::raw(format!(
                "{} - {} ",
                clock_label(point.start_date, &self.tz),
                clock_label(point.end_date, &self.tz)
            )),
            Span::styled(
                format!("({})  ", duration_label(point.start_date, point.end_date)),
                Style::default().fg(HELP_COLOR),
            ),
            Span::styled(
                format!("{} {}", point.point_type.heading(), point.destination.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(star, Style::default().fg(FAVORITE_COLOR)),
        ]);

        let mut details = format!("  {}", format_price(u64::from(point.price)));
        let offers: Vec<String> = point
            .offers
            .iter()
            .take(MAX_CARD_OFFERS)
            .map(|o| format!("{} +{}", o.title, format_price(u64::from(o.price))))
            .collect();
        if !offers.is_empty() {
            details.push_str("   ");
            details.push_str(&offers.join(", "));
        }

        self.lines = vec![
            title,
            Line::from(Span::styled(details, Style::default().fg(HELP_COLOR))),
        ];
    }
}

impl Component for PointCard {
    fn height(&self) -> u16 {
        self.lines.len() as u16
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let mut lines = self.lines.clone();
        if let Some(first) = lines.first_mut() {
            let marker = if ctx.focused { "> " } else { "  " };
            first
                .spans
                .insert(0, Span::styled(marker, Style::default().fg(FOCUS_COLOR)));
        }
        let mut paragraph = Paragraph::new(lines);
        if ctx.focused {
            paragraph = paragraph.style(Style::default().fg(FOCUS_COLOR));
        }
        frame.render_widget(paragraph, area);
    }
}
