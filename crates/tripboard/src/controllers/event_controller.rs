//! Mediates between one point's card and its edit form.
//!
//! A controller is in one of three modes:
//! - `Default`: the card is shown
//! - `Edit`: the form replaced the card
//! - `Adding`: a draft form with no card, shown above the list
//!
//! It never mutates the trip itself. User intents come out as
//! [`ControllerEvent`]s for the trip controller to act on.

use std::time::Instant;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use ratatui::Frame;
use ratatui::layout::Rect;
use tripboard_core::dates::parse_date;
use tripboard_core::{Catalog, Point, PointId};

use crate::components::date_picker::PickerConfig;
use crate::components::edit_form::{EditForm, FormData, FormEnv, FormField, FormIntent, FormMode};
use crate::components::point_card::PointCard;
use crate::components::{Component, RenderContext};
use crate::config::KeybindingsConfig;
use crate::event::AppKeyEvent;
use crate::session::{EditorKey, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    Edit,
    Adding,
}

/// Requested change to the trip data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataChange {
    Create(Point),
    Update {
        old: Point,
        new: Point,
        favorite_only: bool,
    },
    Delete(Point),
    /// Throw away the draft being added; nothing is stored
    DiscardDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    None,
    /// The card asked to be opened for editing
    OpenRequested,
    Data(DataChange),
}

/// Why form data could not become a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    UnknownDestination(String),
    InvalidDate { field: FormField, message: String },
}

/// Lenient price reading: digits only, sign dropped, empty is zero.
pub fn parse_price(text: &str) -> u32 {
    text.trim()
        .parse::<i64>()
        .map(|value| value.unsigned_abs().min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Build a point (without id) from a form snapshot.
pub fn parse_form_data(
    data: &FormData,
    catalog: &Catalog,
    tz: &TimeZone,
) -> Result<Point, FormError> {
    let destination = catalog
        .destination(&data.destination)
        .cloned()
        .ok_or_else(|| FormError::UnknownDestination(data.destination.clone()))?;

    let format = PickerConfig::default().format;
    let date = |field: FormField, text: &str| {
        parse_date(text, format, tz).map_err(|e| FormError::InvalidDate {
            field,
            message: e.to_string(),
        })
    };
    let start_date = date(FormField::StartDate, &data.start)?;
    let end_date = date(FormField::EndDate, &data.end)?;

    let offers = catalog
        .offers_for(data.point_type)
        .iter()
        .filter(|offer| data.offers.contains(&offer.title))
        .cloned()
        .collect();

    Ok(Point {
        id: PointId::default(),
        point_type: data.point_type,
        destination,
        price: parse_price(&data.price),
        start_date,
        end_date,
        offers,
        is_favorite: data.is_favorite,
    })
}

pub struct EventController {
    key: EditorKey,
    point: Point,
    card: PointCard,
    form: EditForm,
    mode: Mode,
}

impl EventController {
    /// Controller for a stored point, showing its card
    pub fn new(point: Point, env: FormEnv) -> Self {
        Self {
            key: EditorKey::Point(point.id.clone()),
            card: PointCard::new(point.clone(), env.tz.clone()),
            form: EditForm::new(point.clone(), FormMode::Edit, env),
            point,
            mode: Mode::Default,
        }
    }

    /// Controller for a new point, with its form already open
    pub fn new_draft(env: FormEnv, now: Timestamp, session: &mut Session) -> Self {
        let point = Point::empty(now);
        let mut form = EditForm::new(point.clone(), FormMode::Adding, env.clone());
        form.attach();
        session.listen_escape(EditorKey::Draft);
        Self {
            key: EditorKey::Draft,
            card: PointCard::new(point.clone(), env.tz),
            form,
            point,
            mode: Mode::Adding,
        }
    }

    pub fn key(&self) -> &EditorKey {
        &self.key
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditForm {
        &mut self.form
    }

    /// Swap the card for the form. Other forms must already be closed.
    pub fn replace_card_with_form(&mut self, session: &mut Session) {
        if self.mode != Mode::Default {
            return;
        }
        self.form.reset();
        self.form.attach();
        self.mode = Mode::Edit;
        session.listen_escape(self.key.clone());
        session.set_create_enabled(true);
        tracing::debug!(key = %self.key, "Form opened");
    }

    pub fn replace_form_with_card(&mut self, session: &mut Session) {
        if self.mode != Mode::Edit {
            return;
        }
        self.form.reset();
        self.form.detach();
        self.mode = Mode::Default;
        session.release_escape(&self.key);
        tracing::debug!(key = %self.key, "Form closed");
    }

    /// Close whatever is open. A draft only loses its pickers here; the
    /// owner drops the controller.
    pub fn set_default_view(&mut self, session: &mut Session) {
        match self.mode {
            Mode::Edit => self.replace_form_with_card(session),
            Mode::Adding => self.destroy(session),
            Mode::Default => {}
        }
    }

    /// Release pickers and the escape listener before the controller goes away.
    pub fn destroy(&mut self, session: &mut Session) {
        self.form.detach();
        session.release_escape(&self.key);
    }

    /// Escape pressed while this controller owns the listener
    pub fn on_escape(&mut self, session: &mut Session) -> ControllerEvent {
        // A form waiting on the backend stays until the answer arrives
        if !self.form.is_interactive() {
            return ControllerEvent::None;
        }
        match self.mode {
            Mode::Adding => {
                session.release_escape(&self.key);
                ControllerEvent::Data(DataChange::DiscardDraft)
            }
            Mode::Edit => {
                self.replace_form_with_card(session);
                ControllerEvent::None
            }
            Mode::Default => ControllerEvent::None,
        }
    }

    /// A newer snapshot of the point arrived from the collection.
    pub fn refresh(&mut self, point: Point) {
        self.card.set_point(point.clone());
        match self.mode {
            Mode::Edit => self.form.refresh(point.clone()),
            _ => self.form = EditForm::new(point.clone(), self.form.mode(), self.form_env()),
        }
        self.point = point;
    }

    fn form_env(&self) -> FormEnv {
        self.form.env().clone()
    }

    /// Request failed: keep the form open, interactive, and shaking.
    pub fn shake(&mut self, now: Instant) {
        self.form.fail(now);
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.form.tick(now)
    }

    pub fn handle_key(
        &mut self,
        key: &AppKeyEvent,
        keys: &KeybindingsConfig,
        session: &mut Session,
        now: Timestamp,
    ) -> ControllerEvent {
        if self.mode == Mode::Default {
            if KeybindingsConfig::matches(key, &keys.navigation.confirm) {
                return ControllerEvent::OpenRequested;
            }
            return ControllerEvent::None;
        }

        match self.form.handle_key(key, keys) {
            FormIntent::None => ControllerEvent::None,
            FormIntent::Submit => self.submit(now),
            FormIntent::Delete => self.delete(session),
            FormIntent::Rollup => {
                self.replace_form_with_card(session);
                ControllerEvent::None
            }
            FormIntent::ToggleFavorite => self.toggle_favorite(),
        }
    }

    /// Parse the form and ask for the point to be stored. The collection is
    /// not touched here; the form waits in Saving for the answer.
    pub fn submit(&mut self, now: Timestamp) -> ControllerEvent {
        let Some(data) = self.form.submit_data() else {
            return ControllerEvent::None;
        };
        let env = self.form.env();
        let mut new = match parse_form_data(&data, &env.catalog, &env.tz) {
            Ok(point) => point,
            Err(FormError::InvalidDate { field, message }) => {
                self.form.mark_date_invalid(field, message);
                return ControllerEvent::None;
            }
            Err(FormError::UnknownDestination(city)) => {
                tracing::warn!(%city, "Form accepted a city the catalog does not know");
                return ControllerEvent::None;
            }
        };

        self.form.begin_saving();
        let change = match self.mode {
            Mode::Adding => {
                new.id = PointId::generate(now);
                DataChange::Create(new)
            }
            _ => {
                new.id = self.point.id.clone();
                DataChange::Update {
                    old: self.point.clone(),
                    new,
                    favorite_only: false,
                }
            }
        };
        ControllerEvent::Data(change)
    }

    pub fn delete(&mut self, session: &mut Session) -> ControllerEvent {
        if !self.form.is_interactive() {
            return ControllerEvent::None;
        }
        match self.mode {
            Mode::Adding => {
                session.release_escape(&self.key);
                ControllerEvent::Data(DataChange::DiscardDraft)
            }
            _ => {
                self.form.begin_deleting();
                ControllerEvent::Data(DataChange::Delete(self.point.clone()))
            }
        }
    }

    pub fn toggle_favorite(&mut self) -> ControllerEvent {
        let Some(is_favorite) = self.form.toggle_favorite() else {
            tracing::debug!(key = %self.key, "Favorite toggle ignored");
            return ControllerEvent::None;
        };
        let mut new = self.point.clone();
        new.is_favorite = is_favorite;
        ControllerEvent::Data(DataChange::Update {
            old: self.point.clone(),
            new,
            favorite_only: true,
        })
    }

    /// Rows the controller takes in a list `width` columns wide
    pub fn height(&self, width: u16) -> u16 {
        match self.mode {
            Mode::Default => self.card.height(),
            _ => self.form.height_for(width),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        match self.mode {
            Mode::Default => self.card.render(frame, area, ctx),
            _ => self.form.render(frame, area, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tripboard_core::{Destination, PointType};

    fn env() -> FormEnv {
        FormEnv::new(
            Catalog::bundled().unwrap(),
            TimeZone::UTC,
            Duration::from_millis(600),
        )
    }

    fn point() -> Point {
        Point {
            id: PointId::from("1"),
            point_type: PointType::Bus,
            destination: Destination {
                name: "Rome".into(),
                ..Destination::default()
            },
            price: 20,
            start_date: "2019-03-18T10:30:00Z".parse().unwrap(),
            end_date: "2019-03-18T11:00:00Z".parse().unwrap(),
            offers: Vec::new(),
            is_favorite: false,
        }
    }

    fn now() -> Timestamp {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_parse_price_is_lenient() {
        assert_eq!(parse_price("42"), 42);
        assert_eq!(parse_price("-42"), 42);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("abc"), 0);
    }

    #[test]
    fn test_open_and_close_registers_escape() {
        let mut session = Session::new();
        let mut controller = EventController::new(point(), env());
        controller.replace_card_with_form(&mut session);
        assert_eq!(controller.mode(), Mode::Edit);
        assert_eq!(session.open_editor(), Some(controller.key()));
        assert_eq!(controller.form().live_pickers(), 2);

        assert_eq!(controller.on_escape(&mut session), ControllerEvent::None);
        assert_eq!(controller.mode(), Mode::Default);
        assert!(session.open_editor().is_none());
        assert_eq!(controller.form().live_pickers(), 0);
    }

    #[test]
    fn test_submit_emits_update_without_touching_point() {
        let mut session = Session::new();
        let mut controller = EventController::new(point(), env());
        controller.replace_card_with_form(&mut session);
        controller.form_mut().set_price_text("55");

        let event = controller.submit(now());
        let ControllerEvent::Data(DataChange::Update {
            old,
            new,
            favorite_only,
        }) = event
        else {
            panic!("expected update, got {event:?}");
        };
        assert!(!favorite_only);
        assert_eq!(old, point());
        assert_eq!(new.price, 55);
        assert_eq!(new.id, point().id);
        assert_eq!(controller.point().price, 20);
        assert!(!controller.form().is_interactive());
    }

    #[test]
    fn test_invalid_date_stays_in_form() {
        let mut session = Session::new();
        let mut controller = EventController::new(point(), env());
        controller.replace_card_with_form(&mut session);
        let data = FormData {
            start: "tomorrow".into(),
            ..controller.form().read_data()
        };
        let result = parse_form_data(&data, &Catalog::bundled().unwrap(), &TimeZone::UTC);
        assert!(matches!(
            result,
            Err(FormError::InvalidDate {
                field: FormField::StartDate,
                ..
            })
        ));
    }

    #[test]
    fn test_draft_submit_creates_with_generated_id() {
        let mut session = Session::new();
        let mut draft = EventController::new_draft(env(), now(), &mut session);
        assert_eq!(session.open_editor(), Some(&EditorKey::Draft));

        draft.form_mut().set_destination_text("Geneva");
        let event = draft.submit(now());
        let ControllerEvent::Data(DataChange::Create(created)) = event else {
            panic!("expected create, got {event:?}");
        };
        assert_eq!(created.id, PointId::generate(now()));
        assert_eq!(created.destination.name, "Geneva");
    }

    #[test]
    fn test_draft_cancel_discards() {
        let mut session = Session::new();
        let mut draft = EventController::new_draft(env(), now(), &mut session);
        assert_eq!(
            draft.delete(&mut session),
            ControllerEvent::Data(DataChange::DiscardDraft)
        );
        assert!(session.open_editor().is_none());
    }

    #[test]
    fn test_favorite_toggle_builds_update() {
        let mut session = Session::new();
        let mut controller = EventController::new(point(), env());
        controller.replace_card_with_form(&mut session);

        let ControllerEvent::Data(DataChange::Update {
            new, favorite_only, ..
        }) = controller.toggle_favorite()
        else {
            panic!("expected favorite update");
        };
        assert!(favorite_only);
        assert!(new.is_favorite);
        assert!(!controller.point().is_favorite);
    }
}
