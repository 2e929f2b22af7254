//! Edit form for one trip point.
//!
//! The form keeps its own transient copy of every field: type, city, dates,
//! price, offer check marks. Nothing reaches the point until the owning
//! controller reads the form on submit. UI state moves through
//!
//! ```text
//! Editing --submit--> Saving   --fail--> Shaking --tick--> Editing
//! Editing --delete--> Deleting --fail--> Shaking
//! ```
//!
//! While Saving or Deleting every input is disabled.

use std::rc::Rc;
use std::time::{Duration, Instant};

use jiff::tz::TimeZone;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use tripboard_core::dates::format_date;
use tripboard_core::{Catalog, Offer, Point, PointType};

use super::date_picker::{DatePicker, PickerConfig, PickerFactory, TextPickerFactory};
use super::text_field::TextField;
use super::{Component, Rerender, RenderContext};
use crate::config::KeybindingsConfig;
use crate::event::{AppKeyEvent, KeyCode};
use crate::util::format::format_price;
use crate::util::styles::{ERROR_COLOR, FAVORITE_COLOR, HELP_COLOR, control_style, form_block};

pub const SAVE_LABEL: &str = "Save";
pub const SAVING_LABEL: &str = "Saving...";
pub const DELETE_LABEL: &str = "Delete";
pub const DELETING_LABEL: &str = "Deleting...";
pub const CANCEL_LABEL: &str = "Cancel";

pub const INVALID_DESTINATION: &str = "Please select a valid value.";
pub const MISSING_DESTINATION: &str = "Please select a value.";

const LABEL_WIDTH: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Editing a stored point
    Edit,
    /// Filling in a draft that has not been stored yet
    Adding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Saving,
    Deleting,
    /// Interactive again after a failure; the cue ends at `until`
    Shaking { until: Instant },
}

/// Focusable controls in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Destination,
    StartDate,
    EndDate,
    Price,
    Offer(usize),
    Save,
    Delete,
    Favorite,
    Rollup,
}

/// What the user asked the form's owner to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIntent {
    None,
    Submit,
    Delete,
    Rollup,
    ToggleFavorite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferChoice {
    pub offer: Offer,
    pub checked: bool,
}

/// Raw snapshot of the form inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormData {
    pub point_type: PointType,
    pub destination: String,
    pub start: String,
    pub end: String,
    pub price: String,
    /// Titles of the checked offers
    pub offers: Vec<String>,
    pub is_favorite: bool,
}

/// Collaborators every form of a trip shares
#[derive(Clone)]
pub struct FormEnv {
    pub catalog: Rc<Catalog>,
    pub tz: TimeZone,
    pub pickers: Rc<dyn PickerFactory>,
    pub shake: Duration,
}

impl FormEnv {
    pub fn new(catalog: Catalog, tz: TimeZone, shake: Duration) -> Self {
        Self {
            catalog: Rc::new(catalog),
            tz,
            pickers: Rc::new(TextPickerFactory),
            shake,
        }
    }

    pub fn with_pickers(mut self, pickers: Rc<dyn PickerFactory>) -> Self {
        self.pickers = pickers;
        self
    }
}

/// Keep only ASCII digits
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

pub struct EditForm {
    env: FormEnv,
    /// Point the form was opened for
    point: Point,
    mode: FormMode,
    state: FormState,
    point_type: PointType,
    destination: TextField,
    /// Last committed city
    city: String,
    destination_error: Option<&'static str>,
    date_error: Option<(FormField, String)>,
    price: TextField,
    offers: Vec<OfferChoice>,
    is_favorite: bool,
    /// Flag shown while a favorite toggle waits for the backend
    pending_favorite: Option<bool>,
    start_text: String,
    end_text: String,
    start_picker: Option<Box<dyn DatePicker>>,
    end_picker: Option<Box<dyn DatePicker>>,
    attached: bool,
    fields: Vec<FormField>,
    focus: usize,
}

impl EditForm {
    /// Build a detached form. Pickers exist only after [`EditForm::attach`].
    pub fn new(point: Point, mode: FormMode, env: FormEnv) -> Self {
        let mut form = Self {
            env,
            point: point.clone(),
            mode,
            state: FormState::Editing,
            point_type: point.point_type,
            destination: TextField::default(),
            city: String::new(),
            destination_error: None,
            date_error: None,
            price: TextField::default(),
            offers: Vec::new(),
            is_favorite: false,
            pending_favorite: None,
            start_text: String::new(),
            end_text: String::new(),
            start_picker: None,
            end_picker: None,
            attached: false,
            fields: Vec::new(),
            focus: 0,
        };
        form.load(point);
        form
    }

    /// Copy every transient field from `point`.
    fn load(&mut self, point: Point) {
        // Old pickers would otherwise write their text back over the point's
        self.destroy_pickers();
        let tz = &self.env.tz;
        self.point_type = point.point_type;
        self.city = point.destination.name.clone();
        self.destination.set(&point.destination.name);
        self.destination_error = None;
        self.date_error = None;
        self.price.set(&point.price.to_string());
        self.is_favorite = point.is_favorite;
        self.pending_favorite = None;
        self.start_text = format_date(point.start_date, PickerConfig::default().format, tz);
        self.end_text = format_date(point.end_date, PickerConfig::default().format, tz);
        self.offers = self.offer_choices(point.point_type, &point);
        self.point = point;
        self.state = FormState::Editing;
        self.focus = 0;
        self.rerender();
    }

    fn offer_choices(&self, point_type: PointType, point: &Point) -> Vec<OfferChoice> {
        let own_type = point_type == point.point_type;
        self.env
            .catalog
            .offers_for(point_type)
            .iter()
            .map(|offer| OfferChoice {
                offer: offer.clone(),
                checked: own_type && point.has_offer(&offer.title),
            })
            .collect()
    }

    pub fn env(&self) -> &FormEnv {
        &self.env
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn point_type(&self) -> PointType {
        self.point_type
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn offers(&self) -> &[OfferChoice] {
        &self.offers
    }

    /// Confirmed favorite flag
    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    /// Flag the star shows, pending toggle included
    pub fn shown_favorite(&self) -> bool {
        self.pending_favorite.unwrap_or(self.is_favorite)
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focused_field(&self) -> FormField {
        self.fields.get(self.focus).copied().unwrap_or(FormField::Type)
    }

    pub fn destination_error(&self) -> Option<&'static str> {
        self.destination_error
    }

    pub fn date_error(&self) -> Option<&(FormField, String)> {
        self.date_error.as_ref()
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.state, FormState::Editing | FormState::Shaking { .. })
    }

    pub fn is_shaking(&self) -> bool {
        matches!(self.state, FormState::Shaking { .. })
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of pickers currently alive
    pub fn live_pickers(&self) -> usize {
        [&self.start_picker, &self.end_picker]
            .into_iter()
            .flatten()
            .filter(|p| p.is_live())
            .count()
    }

    pub fn save_label(&self) -> &'static str {
        match self.state {
            FormState::Saving => SAVING_LABEL,
            _ => SAVE_LABEL,
        }
    }

    pub fn delete_label(&self) -> &'static str {
        match (self.state, self.mode) {
            (FormState::Deleting, _) => DELETING_LABEL,
            (_, FormMode::Adding) => CANCEL_LABEL,
            (_, FormMode::Edit) => DELETE_LABEL,
        }
    }

    /// Show the form: pickers are created.
    pub fn attach(&mut self) {
        self.attached = true;
        self.rebuild_pickers();
    }

    /// Hide the form: pickers are destroyed, typed text is kept.
    pub fn detach(&mut self) {
        self.sync_dates();
        self.destroy_pickers();
        self.attached = false;
    }

    /// Drop every transient edit and go back to the values of the point.
    pub fn reset(&mut self) {
        let point = self.point.clone();
        self.load(point);
    }

    /// The stored point changed underneath an open form (a favorite toggle
    /// went through). Unsaved edits stay.
    pub fn refresh(&mut self, point: Point) {
        self.is_favorite = point.is_favorite;
        self.pending_favorite = None;
        self.point = point;
    }

    pub fn select_type(&mut self, point_type: PointType) {
        if !self.is_interactive() || point_type == self.point_type {
            return;
        }
        self.point_type = point_type;
        self.offers = self.offer_choices(point_type, &self.point);
        self.rerender();
    }

    /// Accept the typed city if the catalog knows it. On rejection the
    /// field carries a validity message and the last good city stays.
    pub fn commit_destination(&mut self) -> bool {
        let typed = self.destination.value().trim().to_string();
        let accepted = self.env.catalog.is_known_city(&typed);
        if accepted {
            self.city = typed;
            self.destination_error = None;
        } else if typed.is_empty() {
            self.destination_error = Some(MISSING_DESTINATION);
        } else {
            self.destination_error = Some(INVALID_DESTINATION);
        }
        self.rerender();
        accepted
    }

    pub fn set_destination_text(&mut self, text: &str) {
        self.destination.set(text);
    }

    pub fn set_price_text(&mut self, text: &str) {
        self.price.set(&digits_only(text));
    }

    pub fn toggle_offer(&mut self, index: usize) {
        if !self.is_interactive() {
            return;
        }
        if let Some(choice) = self.offers.get_mut(index) {
            choice.checked = !choice.checked;
        }
    }

    fn picker_text(&self, field: FormField) -> &str {
        let (picker, text) = match field {
            FormField::EndDate => (&self.end_picker, &self.end_text),
            _ => (&self.start_picker, &self.start_text),
        };
        picker.as_ref().map_or(text.as_str(), |p| p.text())
    }

    pub fn read_data(&self) -> FormData {
        FormData {
            point_type: self.point_type,
            destination: self.city.clone(),
            start: self.picker_text(FormField::StartDate).to_string(),
            end: self.picker_text(FormField::EndDate).to_string(),
            price: self.price.value().to_string(),
            offers: self
                .offers
                .iter()
                .filter(|choice| choice.checked)
                .map(|choice| choice.offer.title.clone())
                .collect(),
            is_favorite: self.is_favorite,
        }
    }

    /// Validate what can be checked locally and snapshot the inputs.
    /// `None` means the form refused to submit.
    pub fn submit_data(&mut self) -> Option<FormData> {
        if !self.is_interactive() {
            return None;
        }
        if self.destination.value().trim() != self.city || self.city.is_empty() {
            self.commit_destination();
        }
        if self.destination_error.is_some() {
            return None;
        }
        Some(self.read_data())
    }

    pub fn mark_date_invalid(&mut self, field: FormField, message: String) {
        self.date_error = Some((field, message));
    }

    pub fn begin_saving(&mut self) {
        self.sync_dates();
        self.state = FormState::Saving;
    }

    pub fn begin_deleting(&mut self) {
        self.sync_dates();
        self.state = FormState::Deleting;
    }

    /// Request failed: inputs come back and the shake cue starts.
    pub fn fail(&mut self, now: Instant) {
        self.state = FormState::Shaking {
            until: now + self.env.shake,
        };
    }

    /// Advance timers. Returns true when the state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            FormState::Shaking { until } if now >= until => {
                self.state = FormState::Editing;
                true
            }
            _ => false,
        }
    }

    /// Flag the favorite toggle should request. The confirmed flag only
    /// changes through [`EditForm::refresh`].
    pub fn toggle_favorite(&self) -> Option<bool> {
        if self.mode == FormMode::Adding || !self.is_interactive() {
            return None;
        }
        Some(!self.is_favorite)
    }

    /// Show `flag` on the star until the request resolves.
    pub fn show_pending_favorite(&mut self, flag: bool) {
        self.pending_favorite = Some(flag);
    }

    /// The toggle failed: the star goes back to the confirmed flag.
    pub fn rollback_favorite(&mut self) {
        self.pending_favorite = None;
    }

    fn sync_dates(&mut self) {
        if let Some(picker) = &self.start_picker {
            self.start_text = picker.text().to_string();
        }
        if let Some(picker) = &self.end_picker {
            self.end_text = picker.text().to_string();
        }
    }

    fn destroy_pickers(&mut self) {
        for mut picker in [self.start_picker.take(), self.end_picker.take()]
            .into_iter()
            .flatten()
        {
            picker.destroy();
        }
    }

    fn rebuild_pickers(&mut self) {
        self.sync_dates();
        self.destroy_pickers();
        if !self.attached {
            return;
        }
        let config = PickerConfig::default();
        let factory = Rc::clone(&self.env.pickers);
        self.start_picker = Some(factory.create(config, &self.start_text, &self.env.tz));
        self.end_picker = Some(factory.create(config, &self.end_text, &self.env.tz));
    }

    fn build_fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Type,
            FormField::Destination,
            FormField::StartDate,
            FormField::EndDate,
            FormField::Price,
        ];
        fields.extend((0..self.offers.len()).map(FormField::Offer));
        fields.extend([FormField::Save, FormField::Delete]);
        if self.mode == FormMode::Edit {
            fields.extend([FormField::Favorite, FormField::Rollup]);
        }
        fields
    }

    fn move_focus(&mut self, forward: bool) {
        if self.focused_field() == FormField::Destination && self.destination.value() != self.city
        {
            self.commit_destination();
        }
        let len = self.fields.len().max(1);
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    fn cycle_type(&mut self, forward: bool) {
        let len = PointType::ALL.len();
        let index = self.point_type.index();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        if let Some(point_type) = PointType::from_index(next) {
            self.select_type(point_type);
        }
    }

    fn cycle_city(&mut self, forward: bool) {
        let names: Vec<&str> = self.env.catalog.city_names().collect();
        if names.is_empty() {
            return;
        }
        let current = names.iter().position(|n| *n == self.destination.value());
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % names.len(),
            (Some(i), false) => (i + names.len() - 1) % names.len(),
            (None, true) => 0,
            (None, false) => names.len() - 1,
        };
        let name = names[next].to_string();
        self.destination.set(&name);
        self.commit_destination();
    }

    pub fn handle_key(&mut self, key: &AppKeyEvent, keys: &KeybindingsConfig) -> FormIntent {
        if !self.is_interactive() {
            return FormIntent::None;
        }
        let edit = self.mode == FormMode::Edit;

        if KeybindingsConfig::matches(key, &keys.form.submit) {
            return FormIntent::Submit;
        }
        if KeybindingsConfig::matches(key, &keys.form.delete) {
            return FormIntent::Delete;
        }
        if edit && KeybindingsConfig::matches(key, &keys.form.favorite) {
            return FormIntent::ToggleFavorite;
        }
        if edit && KeybindingsConfig::matches(key, &keys.form.rollup) {
            return FormIntent::Rollup;
        }
        if key.is_back_tab() || KeybindingsConfig::matches(key, &keys.navigation.prev_field) {
            self.move_focus(false);
            return FormIntent::None;
        }
        if KeybindingsConfig::matches(key, &keys.navigation.next_field) {
            self.move_focus(true);
            return FormIntent::None;
        }

        let confirm = KeybindingsConfig::matches(key, &keys.navigation.confirm);
        let toggle = confirm || KeybindingsConfig::matches(key, &keys.form.toggle);
        let consumed = match self.focused_field() {
            FormField::Type if KeybindingsConfig::matches(key, &keys.navigation.left) => {
                self.cycle_type(false);
                true
            }
            FormField::Type if KeybindingsConfig::matches(key, &keys.navigation.right) => {
                self.cycle_type(true);
                true
            }
            FormField::Destination => match key.code {
                _ if confirm => {
                    self.commit_destination();
                    true
                }
                KeyCode::Up => {
                    self.cycle_city(false);
                    true
                }
                KeyCode::Down => {
                    self.cycle_city(true);
                    true
                }
                _ => self.destination.handle_key(key),
            },
            field @ (FormField::StartDate | FormField::EndDate) => {
                let picker = if field == FormField::StartDate {
                    self.start_picker.as_mut()
                } else {
                    self.end_picker.as_mut()
                };
                let consumed = picker.is_some_and(|p| p.handle_key(key));
                if consumed && self.date_error.as_ref().is_some_and(|(f, _)| *f == field) {
                    self.date_error = None;
                }
                consumed
            }
            FormField::Price => match key.typed_char() {
                Some(c) if c.is_ascii_digit() => self.price.handle_key(key),
                // Anything else typed into the price is dropped
                Some(_) => true,
                None => self.price.handle_key(key),
            },
            FormField::Offer(index) if toggle => {
                self.toggle_offer(index);
                true
            }
            FormField::Save if confirm => return FormIntent::Submit,
            FormField::Delete if confirm => return FormIntent::Delete,
            FormField::Favorite if toggle => return FormIntent::ToggleFavorite,
            FormField::Rollup if confirm => return FormIntent::Rollup,
            _ => false,
        };

        if !consumed {
            match key.code {
                KeyCode::Up => self.move_focus(false),
                KeyCode::Down => self.move_focus(true),
                _ => {}
            }
        }
        FormIntent::None
    }

    fn input_spans(&self, field: &TextField, focused: bool) -> Vec<Span<'static>> {
        self.text_spans(field.value(), field.cursor(), focused)
    }

    fn text_spans(&self, value: &str, cursor: usize, focused: bool) -> Vec<Span<'static>> {
        let style = control_style(focused, !self.is_interactive());
        if !focused || !self.is_interactive() {
            return vec![Span::styled(value.to_string(), style)];
        }
        let split = value
            .char_indices()
            .nth(cursor)
            .map_or(value.len(), |(i, _)| i);
        let (before, rest) = value.split_at(split);
        let mut chars = rest.chars();
        let at = chars.next().map_or(" ".to_string(), String::from);
        vec![
            Span::styled(before.to_string(), style),
            Span::styled(at, style.add_modifier(Modifier::REVERSED)),
            Span::styled(chars.as_str().to_string(), style),
        ]
    }

    fn label(text: &str) -> Span<'static> {
        Span::styled(
            format!("{text:<LABEL_WIDTH$}"),
            Style::default().fg(HELP_COLOR),
        )
    }

    fn button(&self, text: &str, field: FormField) -> Span<'static> {
        let focused = self.focused_field() == field;
        Span::styled(
            format!("[ {text} ]"),
            control_style(focused, !self.is_interactive()),
        )
    }

    fn date_spans(&self, field: FormField) -> Vec<Span<'static>> {
        let focused = self.focused_field() == field;
        let picker = match field {
            FormField::StartDate => &self.start_picker,
            _ => &self.end_picker,
        };
        match picker {
            Some(p) => self.text_spans(p.text(), p.cursor(), focused),
            None => vec![Span::raw(self.picker_text(field).to_string())],
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let disabled = !self.is_interactive();
        let focused = |field| self.focused_field() == field;
        let mut lines = Vec::new();

        lines.push(Line::from(vec![
            Self::label("Type"),
            Span::styled(
                format!("< {} >", self.point_type.label()),
                control_style(focused(FormField::Type), disabled),
            ),
        ]));

        let mut destination = vec![Self::label(&self.point_type.heading())];
        destination.extend(self.input_spans(&self.destination, focused(FormField::Destination)));
        if let Some(message) = self.destination_error {
            destination.push(Span::styled(
                format!("  {message}"),
                Style::default().fg(ERROR_COLOR),
            ));
        }
        lines.push(Line::from(destination));

        let mut dates = vec![Self::label("From")];
        dates.extend(self.date_spans(FormField::StartDate));
        dates.push(Span::raw("  To "));
        dates.extend(self.date_spans(FormField::EndDate));
        if let Some((_, message)) = &self.date_error {
            dates.push(Span::styled(
                format!("  {message}"),
                Style::default().fg(ERROR_COLOR),
            ));
        }
        lines.push(Line::from(dates));

        let mut price = vec![Self::label("Price"), Span::raw("€ ")];
        price.extend(self.input_spans(&self.price, focused(FormField::Price)));
        lines.push(Line::from(price));

        if !self.offers.is_empty() {
            lines.push(Line::from(Self::label("Offers")));
            for (i, choice) in self.offers.iter().enumerate() {
                let mark = if choice.checked { "[x]" } else { "[ ]" };
                lines.push(Line::from(Span::styled(
                    format!(
                        "  {mark} {}  +{}",
                        choice.offer.title,
                        format_price(u64::from(choice.offer.price))
                    ),
                    control_style(focused(FormField::Offer(i)), disabled),
                )));
            }
        }

        let mut buttons = vec![
            self.button(self.save_label(), FormField::Save),
            Span::raw(" "),
            self.button(self.delete_label(), FormField::Delete),
        ];
        if self.mode == FormMode::Edit {
            let shown = self.shown_favorite();
            let star = if shown { "★" } else { "☆" };
            let mut favorite = self.button(star, FormField::Favorite);
            if shown && !focused(FormField::Favorite) {
                favorite = favorite.style(Style::default().fg(FAVORITE_COLOR));
            }
            buttons.extend([
                Span::raw(" "),
                favorite,
                Span::raw(" "),
                self.button("^", FormField::Rollup),
            ]);
        }
        lines.push(Line::from(buttons));

        if let Some(destination) = self.env.catalog.destination(&self.city) {
            if !destination.description.is_empty() {
                lines.push(Line::from(Span::styled(
                    destination.description.clone(),
                    Style::default().fg(HELP_COLOR),
                )));
            }
            if !destination.pictures.is_empty() {
                let captions: Vec<&str> = destination
                    .pictures
                    .iter()
                    .map(|p| p.description.as_str())
                    .collect();
                lines.push(Line::from(Span::styled(
                    format!("Photos: {}", captions.join(", ")),
                    Style::default().fg(HELP_COLOR),
                )));
            }
        }

        lines
    }

    fn help_text(&self, keys: &KeybindingsConfig) -> String {
        let hint = KeybindingsConfig::hint;
        let mut help = format!(
            "{}: save | {}: {} | esc: close",
            hint(&keys.form.submit),
            hint(&keys.form.delete),
            self.delete_label().to_lowercase(),
        );
        if self.mode == FormMode::Edit {
            help.push_str(&format!(" | {}: favorite", hint(&keys.form.favorite)));
        }
        help
    }
}

impl Rerender for EditForm {
    /// Regenerate the focus order from the transient state and recreate both
    /// pickers, keeping the focused control and the typed dates.
    fn rerender(&mut self) {
        let focused = self.fields.get(self.focus).copied();
        self.fields = self.build_fields();
        self.focus = focused
            .and_then(|field| self.fields.iter().position(|f| *f == field))
            .unwrap_or_else(|| self.focus.min(self.fields.len().saturating_sub(1)));
        self.rebuild_pickers();
    }
}

impl EditForm {
    /// Rows the form needs when rendered `width` columns wide, wrapping included
    pub fn height_for(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(2);
        let rows: u16 = self
            .lines()
            .iter()
            .map(|line| wrapped_rows(line, inner))
            .sum();
        rows + 2
    }
}

/// Rows a line takes once word-wrapped into `width` columns
fn wrapped_rows(line: &Line, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
    let width = usize::from(width);
    let mut rows = 1;
    let mut column = 0;
    for word in text.split(' ') {
        let word_width = Span::raw(word).width();
        if column > 0 && column + 1 + word_width <= width {
            column += 1 + word_width;
            continue;
        }
        if column > 0 {
            rows += 1;
        }
        // Words longer than a row are broken across rows
        rows += word_width.saturating_sub(1) / width;
        column = word_width - word_width.saturating_sub(1) / width * width;
    }
    u16::try_from(rows).unwrap_or(u16::MAX)
}

impl Component for EditForm {
    fn height(&self) -> u16 {
        // Borders plus one row per line
        self.lines().len() as u16 + 2
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let title = match self.mode {
            FormMode::Adding => " New point ".to_string(),
            FormMode::Edit => format!(
                " {} {} ",
                self.point.point_type.heading(),
                self.point.destination.name
            ),
        };
        let block = form_block(&title, self.is_shaking(), &self.help_text(ctx.keys));
        let paragraph = Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripboard_core::{Destination, PointId};

    fn env() -> FormEnv {
        FormEnv::new(
            Catalog::bundled().unwrap(),
            TimeZone::UTC,
            Duration::from_millis(600),
        )
    }

    fn point() -> Point {
        let catalog = Catalog::bundled().unwrap();
        let luggage = catalog.offers_for(PointType::Flight)[0].clone();
        Point {
            id: PointId::from("1"),
            point_type: PointType::Flight,
            destination: catalog.destination("Geneva").cloned().unwrap_or(Destination {
                name: "Geneva".into(),
                ..Destination::default()
            }),
            price: 120,
            start_date: "2019-03-18T10:30:00Z".parse().unwrap(),
            end_date: "2019-03-18T12:00:00Z".parse().unwrap(),
            offers: vec![luggage],
            is_favorite: false,
        }
    }

    fn attached(mode: FormMode) -> EditForm {
        let mut form = EditForm::new(point(), mode, env());
        form.attach();
        form
    }

    fn keys() -> KeybindingsConfig {
        KeybindingsConfig::default()
    }

    #[test]
    fn test_initial_state_from_point() {
        let form = attached(FormMode::Edit);
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(form.city(), "Geneva");
        assert_eq!(form.live_pickers(), 2);

        let data = form.read_data();
        assert_eq!(data.start, "18/03/19 10:30");
        assert_eq!(data.end, "18/03/19 12:00");
        assert_eq!(data.price, "120");
        assert_eq!(data.offers.len(), 1);
        assert_eq!(form.fields().last(), Some(&FormField::Rollup));
    }

    #[test]
    fn test_type_change_resets_offers_and_back_restores() {
        let mut form = attached(FormMode::Edit);
        form.select_type(PointType::Taxi);
        assert_eq!(form.point_type(), PointType::Taxi);
        assert!(form.offers().iter().all(|c| !c.checked));
        assert!(form.read_data().offers.is_empty());

        form.select_type(PointType::Flight);
        assert_eq!(form.read_data().offers.len(), 1);
    }

    #[test]
    fn test_rerender_recreates_pickers_and_keeps_typed_dates() {
        let mut form = attached(FormMode::Edit);
        form.focus = form.fields().iter().position(|f| *f == FormField::StartDate).unwrap();
        form.handle_key(&AppKeyEvent::plain(KeyCode::Up), &keys());
        assert_eq!(form.read_data().start, "19/03/19 10:30");

        form.select_type(PointType::Bus);
        assert_eq!(form.live_pickers(), 2);
        assert_eq!(form.read_data().start, "19/03/19 10:30");
        assert_eq!(form.focused_field(), FormField::StartDate);
    }

    #[test]
    fn test_unknown_city_is_rejected() {
        let mut form = attached(FormMode::Edit);
        form.set_destination_text("Atlantis");
        assert!(!form.commit_destination());
        assert_eq!(form.destination_error(), Some(INVALID_DESTINATION));
        assert_eq!(form.city(), "Geneva");
        assert!(form.submit_data().is_none());

        form.set_destination_text("");
        form.commit_destination();
        assert_eq!(form.destination_error(), Some(MISSING_DESTINATION));

        form.set_destination_text("Rome");
        assert!(form.commit_destination());
        assert_eq!(form.submit_data().unwrap().destination, "Rome");
    }

    #[test]
    fn test_price_accepts_digits_only() {
        let mut form = attached(FormMode::Edit);
        form.focus = form.fields().iter().position(|f| *f == FormField::Price).unwrap();
        for c in "-4a2".chars() {
            form.handle_key(&AppKeyEvent::char(c), &keys());
        }
        assert_eq!(form.read_data().price, "12042");

        form.set_price_text("7e1");
        assert_eq!(form.read_data().price, "71");
    }

    #[test]
    fn test_saving_disables_and_relabels() {
        let mut form = attached(FormMode::Edit);
        form.begin_saving();
        assert!(!form.is_interactive());
        assert_eq!(form.save_label(), SAVING_LABEL);
        assert_eq!(form.toggle_favorite(), None);
        assert_eq!(
            form.handle_key(&AppKeyEvent::ctrl(KeyCode::Char('s')), &keys()),
            FormIntent::None
        );

        let mut form = attached(FormMode::Edit);
        form.begin_deleting();
        assert_eq!(form.delete_label(), DELETING_LABEL);
    }

    #[test]
    fn test_shake_ends_after_duration() {
        let mut form = attached(FormMode::Edit);
        form.begin_saving();
        let t0 = Instant::now();
        form.fail(t0);
        assert!(form.is_interactive());
        assert!(form.is_shaking());
        assert_eq!(form.save_label(), SAVE_LABEL);

        assert!(!form.tick(t0 + Duration::from_millis(599)));
        assert!(form.is_shaking());
        assert!(form.tick(t0 + Duration::from_millis(600)));
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn test_adding_mode_has_cancel_and_no_favorite() {
        let mut form = EditForm::new(Point::empty(jiff::Timestamp::now()), FormMode::Adding, env());
        form.attach();
        assert_eq!(form.delete_label(), CANCEL_LABEL);
        assert!(!form.fields().contains(&FormField::Favorite));
        assert!(!form.fields().contains(&FormField::Rollup));
        assert_eq!(form.toggle_favorite(), None);
        assert_eq!(
            form.handle_key(&AppKeyEvent::ctrl(KeyCode::Char('f')), &keys()),
            FormIntent::None
        );
        // Empty draft city must be chosen before submitting
        assert!(form.submit_data().is_none());
        assert_eq!(form.destination_error(), Some(MISSING_DESTINATION));
    }

    #[test]
    fn test_favorite_does_not_flip_until_refresh() {
        let mut form = attached(FormMode::Edit);
        assert_eq!(form.toggle_favorite(), Some(true));
        assert!(!form.is_favorite());

        let mut stored = form.point().clone();
        stored.is_favorite = true;
        form.refresh(stored);
        assert!(form.is_favorite());
        assert_eq!(form.toggle_favorite(), Some(false));
    }

    #[test]
    fn test_height_counts_wrapped_description() {
        let form = attached(FormMode::Edit);
        let geneva = form.env.catalog.destination("Geneva").unwrap();
        assert!(Span::raw(geneva.description.as_str()).width() > 40);

        assert_eq!(form.height_for(u16::MAX), form.height());
        assert!(form.height_for(42) > form.height());
        assert!(form.height_for(24) > form.height_for(42));
    }

    #[test]
    fn test_wrapped_rows_breaks_on_words() {
        let line = Line::from("aaa bbb ccc");
        assert_eq!(wrapped_rows(&line, 11), 1);
        assert_eq!(wrapped_rows(&line, 7), 2);
        assert_eq!(wrapped_rows(&line, 3), 3);
        assert_eq!(wrapped_rows(&Line::from("abcdefgh"), 3), 3);
        assert_eq!(wrapped_rows(&Line::from(""), 10), 1);
    }

    #[test]
    fn test_pending_star_rolls_back() {
        let mut form = attached(FormMode::Edit);
        form.show_pending_favorite(true);
        assert!(form.shown_favorite());
        assert!(!form.is_favorite());

        form.rollback_favorite();
        assert!(!form.shown_favorite());
    }

    #[test]
    fn test_detach_destroys_pickers_and_reset_discards_edits() {
        let mut form = attached(FormMode::Edit);
        form.select_type(PointType::Ship);
        form.detach();
        assert_eq!(form.live_pickers(), 0);
        assert!(!form.is_attached());

        form.reset();
        assert_eq!(form.point_type(), PointType::Flight);
        assert_eq!(form.live_pickers(), 0);
    }

    #[test]
    fn test_reset_restores_typed_dates() {
        let mut form = attached(FormMode::Edit);
        form.focus = 3;
        assert_eq!(form.focused_field(), FormField::EndDate);
        form.handle_key(&AppKeyEvent::plain(KeyCode::Down), &keys());
        assert_eq!(form.read_data().end, "17/03/19 12:00");

        form.reset();
        assert_eq!(form.read_data().end, "18/03/19 12:00");
        assert_eq!(form.live_pickers(), 2);
    }

    #[test]
    fn test_leaving_destination_commits_it() {
        let mut form = attached(FormMode::Edit);
        form.focus = 1;
        assert_eq!(form.focused_field(), FormField::Destination);
        form.set_destination_text("Rome");
        form.handle_key(&AppKeyEvent::plain(KeyCode::Tab), &keys());
        assert_eq!(form.city(), "Rome");
        assert_eq!(form.focused_field(), FormField::StartDate);
    }
}
