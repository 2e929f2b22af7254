//! Date/time pickers used by the edit form.
//!
//! The form owns two independent pickers (start and end). They are built
//! through a [`PickerFactory`] so the form can drop and rebuild them on every
//! re-render without caring about the concrete widget.

use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use tripboard_core::dates::{FORM_DATE_FORMAT, format_date, parse_date};
use tripboard_core::error::DateError;

use super::text_field::TextField;
use crate::event::{AppKeyEvent, KeyCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerConfig {
    /// Free text typing, not just stepping
    pub allow_input: bool,
    pub enable_time: bool,
    pub format: &'static str,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            allow_input: true,
            enable_time: true,
            format: FORM_DATE_FORMAT,
        }
    }
}

pub trait DatePicker {
    fn text(&self) -> &str;

    fn cursor(&self) -> usize;

    /// Parsed value of the current text
    fn value(&self) -> Result<Timestamp, DateError>;

    /// Returns true when the key was consumed
    fn handle_key(&mut self, key: &AppKeyEvent) -> bool;

    /// Release the picker. Further use is a no-op.
    fn destroy(&mut self);

    fn is_live(&self) -> bool;
}

pub trait PickerFactory {
    fn create(&self, config: PickerConfig, initial: &str, tz: &TimeZone) -> Box<dyn DatePicker>;
}

/// Keyboard picker: typed text plus arrow-key stepping
/// (Up/Down one day, Shift+Up/Down one hour).
pub struct TextDatePicker {
    config: PickerConfig,
    field: TextField,
    tz: TimeZone,
    live: bool,
}

impl TextDatePicker {
    pub fn new(config: PickerConfig, initial: &str, tz: &TimeZone) -> Self {
        Self {
            config,
            field: TextField::new(initial),
            tz: tz.clone(),
            live: true,
        }
    }

    fn step(&mut self, by: SignedDuration) {
        // Stepping an unreadable text does nothing
        let Ok(current) = self.value() else {
            return;
        };
        if let Ok(next) = current.checked_add(by) {
            self.field
                .set(&format_date(next, self.config.format, &self.tz));
        }
    }

    fn accepts(&self, c: char) -> bool {
        c.is_ascii_digit() || matches!(c, '/' | ':' | ' ' | '-' | '.')
    }
}

impl DatePicker for TextDatePicker {
    fn text(&self) -> &str {
        self.field.value()
    }

    fn cursor(&self) -> usize {
        self.field.cursor()
    }

    fn value(&self) -> Result<Timestamp, DateError> {
        parse_date(self.field.value(), self.config.format, &self.tz)
    }

    fn handle_key(&mut self, key: &AppKeyEvent) -> bool {
        if !self.live {
            return false;
        }
        let hour = SignedDuration::from_hours(1);
        let day = SignedDuration::from_hours(24);
        match key.code {
            KeyCode::Up if key.shift && self.config.enable_time => self.step(hour),
            KeyCode::Down if key.shift && self.config.enable_time => self.step(-hour),
            KeyCode::Up => self.step(day),
            KeyCode::Down => self.step(-day),
            KeyCode::Char(c) if key.typed_char().is_some() => {
                if !self.config.allow_input || !self.accepts(c) {
                    return false;
                }
                self.field.insert_char(c);
            }
            _ if self.config.allow_input => return self.field.handle_key(key),
            _ => return false,
        }
        true
    }

    fn destroy(&mut self) {
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextPickerFactory;

impl PickerFactory for TextPickerFactory {
    fn create(&self, config: PickerConfig, initial: &str, tz: &TimeZone) -> Box<dyn DatePicker> {
        Box::new(TextDatePicker::new(config, initial, tz))
    }
}
