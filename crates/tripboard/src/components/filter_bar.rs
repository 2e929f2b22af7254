use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
};
use tripboard_core::FilterType;

use super::{Component, RenderContext};
use crate::config::KeybindingsConfig;
use crate::util::styles::DISABLED_COLOR;

/// One tab per filter plus the "new event" control
#[derive(Debug, Clone, Default)]
pub struct FilterBar {
    active: FilterType,
    disabled: [bool; 3],
    create_enabled: bool,
}

impl FilterBar {
    pub fn set_active(&mut self, filter: FilterType) {
        self.active = filter;
    }

    pub fn set_disabled(&mut self, filter: FilterType, disabled: bool) {
        self.disabled[Self::slot(filter)] = disabled;
    }

    pub fn set_create_enabled(&mut self, enabled: bool) {
        self.create_enabled = enabled;
    }

    pub fn is_disabled(&self, filter: FilterType) -> bool {
        self.disabled[Self::slot(filter)]
    }

    pub fn active(&self) -> FilterType {
        self.active
    }

    fn slot(filter: FilterType) -> usize {
        FilterType::ALL
            .iter()
            .position(|f| *f == filter)
            .unwrap_or(0)
    }
}

impl Component for FilterBar {
    fn height(&self) -> u16 {
        2
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let global = &ctx.keys.global;
        let hints = [
            &global.filter_everything,
            &global.filter_future,
            &global.filter_past,
        ];
        let mut titles: Vec<Line> = FilterType::ALL
            .iter()
            .zip(hints)
            .map(|(filter, keys)| {
                let content = format!("[{}] {}", KeybindingsConfig::hint(keys), filter.name());
                let style = if self.is_disabled(*filter) {
                    Style::default()
                        .fg(DISABLED_COLOR)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else if *filter == self.active {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(Span::styled(content, style))
            })
            .collect();

        let new_style = if self.create_enabled {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(DISABLED_COLOR)
        };
        titles.push(Line::from(Span::styled(
            format!("[{}] New event", KeybindingsConfig::hint(&global.new_point)),
            new_style,
        )));

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::BOTTOM))
            .select(Self::slot(self.active))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_widget(tabs, area);
    }
}
