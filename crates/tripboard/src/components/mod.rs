pub mod date_picker;
pub mod edit_form;
pub mod filter_bar;
pub mod point_card;
pub mod status_bar;
pub mod text_field;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::config::KeybindingsConfig;

/// Result of handling an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Event was handled, continue
    Handled,
    /// Event was not handled, pass to parent
    NotHandled,
    /// Request app exit
    Exit,
}

/// Shared inputs for drawing a frame
pub struct RenderContext<'a> {
    pub keys: &'a KeybindingsConfig,
    /// Whether the component has keyboard focus
    pub focused: bool,
}

/// Trait for components that can be drawn into a slot of the trip list
pub trait Component {
    /// Rows the component occupies
    fn height(&self) -> u16;

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext);
}

/// Components whose presentation is derived from transient state implement
/// this to rebuild it in place after that state changes.
pub trait Rerender {
    fn rerender(&mut self);
}
