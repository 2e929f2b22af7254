//! Common styling utilities for TUI components

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders};

/// Standard color for focused panels
pub const FOCUS_COLOR: Color = Color::Yellow;

/// Standard color for help text
pub const HELP_COLOR: Color = Color::DarkGray;

/// Standard color for headers
pub const HEADER_COLOR: Color = Color::Cyan;

pub const FAVORITE_COLOR: Color = Color::LightYellow;

pub const ERROR_COLOR: Color = Color::Red;

pub const DISABLED_COLOR: Color = Color::DarkGray;

/// Create a block with title and bottom help text that shows focused state.
///
/// The help text is only shown when the panel is focused.
///
/// # Example
/// ```ignore
/// let block = focused_block_with_help("Trip", is_focused, "n: new | enter: edit");
/// ```
pub fn focused_block_with_help(title: &str, focused: bool, help_text: &str) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(FOCUS_COLOR)
    } else {
        Style::default()
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title.to_string());

    if focused && !help_text.is_empty() {
        block = block.title_bottom(Line::from(format!(" {help_text} ")).fg(HELP_COLOR));
    }

    block
}

/// Frame around an open edit form. A failed request paints it red with a
/// thick border for as long as the shake lasts.
pub fn form_block(title: &str, shaking: bool, help_text: &str) -> Block<'static> {
    let block = focused_block_with_help(title, true, help_text);
    if shaking {
        block
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(ERROR_COLOR))
    } else {
        block.border_type(BorderType::Rounded)
    }
}

/// Style for an input or button, dimmed when the form is busy
pub fn control_style(focused: bool, disabled: bool) -> Style {
    match (focused, disabled) {
        (_, true) => Style::default().fg(DISABLED_COLOR),
        (true, false) => Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD),
        (false, false) => Style::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_style_disabled_wins() {
        assert_eq!(control_style(true, true).fg, Some(DISABLED_COLOR));
        assert_eq!(control_style(true, false).fg, Some(FOCUS_COLOR));
        assert_eq!(control_style(false, false).fg, None);
    }
}
