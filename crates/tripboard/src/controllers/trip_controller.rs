//! Top level controller of the trip list.
//!
//! Owns the events collection and one [`EventController`] per visible point.
//! Data changes coming out of the controllers become persistence requests;
//! the collection only changes once the backend answers. Every collection
//! change re-renders the list from the new snapshot.

use std::sync::mpsc::Receiver;

use jiff::Timestamp;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use rustc_hash::{FxHashMap, FxHashSet};
use tripboard_core::{CollectionChange, EventsCollection, FilterType, Point, PointId};

use super::event_controller::{ControllerEvent, DataChange, EventController, Mode};
use super::filter_controller::FilterController;
use super::Moment;
use crate::components::edit_form::FormEnv;
use crate::components::status_bar::{StatusBar, TripSummary};
use crate::components::{Component, EventResult, RenderContext};
use crate::config::KeybindingsConfig;
use crate::event::AppKeyEvent;
use crate::session::{EditorKey, Session};
use crate::util::format::day_label;
use crate::util::styles::{HEADER_COLOR, HELP_COLOR};
use crate::worker::{Dispatcher, PersistenceRequest, PersistenceResponse};

pub struct TripController {
    collection: EventsCollection,
    changes: Receiver<CollectionChange>,
    filters: FilterController,
    controllers: Vec<EventController>,
    draft: Option<EventController>,
    selected: usize,
    session: Session,
    env: FormEnv,
    dispatcher: Box<dyn Dispatcher>,
    /// Editors with a request in flight
    pending: FxHashSet<EditorKey>,
    status: StatusBar,
}

/// Look up an editor without borrowing the rest of the trip controller
fn find_controller<'a>(
    controllers: &'a mut [EventController],
    draft: &'a mut Option<EventController>,
    key: &EditorKey,
) -> Option<&'a mut EventController> {
    match key {
        EditorKey::Draft => draft.as_mut(),
        EditorKey::Point(_) => controllers.iter_mut().find(|c| c.key() == key),
    }
}

enum Row<'a> {
    DayHeader { day: usize, label: String },
    Editor {
        controller: &'a EventController,
        focused: bool,
    },
}

impl TripController {
    pub fn new(
        points: Vec<Point>,
        env: FormEnv,
        dispatcher: Box<dyn Dispatcher>,
        now: Timestamp,
    ) -> Self {
        let mut collection = EventsCollection::new(points);
        let changes = collection.subscribe();
        let filters = FilterController::new(&mut collection, now);
        let mut trip = Self {
            collection,
            changes,
            filters,
            controllers: Vec::new(),
            draft: None,
            selected: 0,
            session: Session::new(),
            env,
            dispatcher,
            pending: FxHashSet::default(),
            status: StatusBar::default(),
        };
        trip.render_points(now);
        trip.sync_create_button();
        trip
    }

    pub fn collection(&self) -> &EventsCollection {
        &self.collection
    }

    pub fn controllers(&self) -> &[EventController] {
        &self.controllers
    }

    pub fn draft(&self) -> Option<&EventController> {
        self.draft.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn filters(&self) -> &FilterController {
        &self.filters
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn is_pending(&self, key: &EditorKey) -> bool {
        self.pending.contains(key)
    }

    pub fn controller(&self, id: &PointId) -> Option<&EventController> {
        self.controllers.iter().find(|c| &c.point().id == id)
    }

    /// Number of forms currently shown
    pub fn open_forms(&self) -> usize {
        self.controllers
            .iter()
            .filter(|c| c.mode() != Mode::Default)
            .count()
            + usize::from(self.draft.is_some())
    }

    /// Rebuild the visible controllers from the collection. Controllers of
    /// points that are still visible are kept (an open form stays open).
    fn render_points(&mut self, now: Timestamp) {
        let mut existing: FxHashMap<PointId, EventController> = self
            .controllers
            .drain(..)
            .map(|c| (c.point().id.clone(), c))
            .collect();

        let mut visible = Vec::new();
        for point in self.collection.filtered(now) {
            let controller = match existing.remove(&point.id) {
                Some(mut controller) => {
                    if controller.point() != point {
                        controller.refresh(point.clone());
                    }
                    controller
                }
                None => EventController::new(point.clone(), self.env.clone()),
            };
            visible.push(controller);
        }

        for (_, mut gone) in existing {
            gone.destroy(&mut self.session);
        }

        self.controllers = visible;
        self.selected = self.selected.min(self.controllers.len().saturating_sub(1));
        self.status.set_summary(TripSummary::from_points(
            self.collection.points(),
            &self.env.tz,
        ));
    }

    fn sync_create_button(&mut self) {
        self.filters
            .set_create_enabled(self.session.is_create_enabled());
    }

    /// Pick up collection notifications and reflect them in the view.
    fn sync(&mut self, now: Timestamp) {
        if self.changes.try_iter().count() > 0 {
            self.render_points(now);
        }
        self.filters.poll(&self.collection, now);
        self.sync_create_button();
    }

    /// Close every open form. A draft is discarded.
    pub fn on_view_change(&mut self, now: Timestamp) {
        for controller in &mut self.controllers {
            controller.set_default_view(&mut self.session);
        }
        if self.draft.is_some() {
            self.discard_draft(now);
        }
    }

    /// Open the form of the point at `index`, closing any other one first.
    pub fn open(&mut self, index: usize, now: Timestamp) {
        if index >= self.controllers.len() {
            return;
        }
        self.on_view_change(now);
        self.selected = index;
        self.controllers[index].replace_card_with_form(&mut self.session);
        self.sync_create_button();
    }

    /// Start adding a new point at the top of the list.
    pub fn create_point(&mut self, now: Timestamp) {
        if !self.session.is_create_enabled() || self.draft.is_some() {
            return;
        }
        self.on_view_change(now);
        self.filters.set_default_filter(&mut self.collection, now);
        self.filters.disable_all(&self.collection, now);
        self.draft = Some(EventController::new_draft(
            self.env.clone(),
            now,
            &mut self.session,
        ));
        self.session.set_create_enabled(false);
        self.sync(now);
    }

    fn discard_draft(&mut self, now: Timestamp) {
        if let Some(mut draft) = self.draft.take() {
            draft.destroy(&mut self.session);
        }
        self.session.set_create_enabled(true);
        self.filters.enable_all(&self.collection, now);
    }

    pub fn activate_filter(&mut self, filter: FilterType, now: Timestamp) -> bool {
        let applied = self.filters.activate(filter, &mut self.collection, now);
        if applied {
            self.selected = 0;
            self.sync(now);
        }
        applied
    }

    /// Turn a controller's data change into at most one request.
    pub fn on_data_change(&mut self, change: DataChange, at: Moment) {
        let request = match change {
            DataChange::DiscardDraft => {
                self.discard_draft(at.wall);
                return;
            }
            DataChange::Create(point) => PersistenceRequest::Create {
                point: point.to_wire(),
            },
            DataChange::Update {
                old,
                new,
                favorite_only,
            } => PersistenceRequest::Update {
                id: old.id,
                point: new.to_wire(),
                favorite_only,
            },
            DataChange::Delete(point) => PersistenceRequest::Delete { id: point.id },
        };
        self.dispatch(request, at);
    }

    fn dispatch(&mut self, request: PersistenceRequest, at: Moment) {
        let Some(target) = request.target() else {
            return;
        };
        let favorite = match &request {
            PersistenceRequest::Update {
                point,
                favorite_only: true,
                ..
            } => Some(point.is_favorite),
            _ => None,
        };

        let refused = if self.pending.contains(&target) {
            tracing::warn!(%target, "Request refused: another one is in flight");
            Some("Previous change is still being saved".to_string())
        } else if !self.dispatcher.send(request) {
            tracing::error!(%target, "Persistence worker is not running");
            Some("Storage is not available".to_string())
        } else {
            None
        };

        match refused {
            None => {
                if let Some(flag) = favorite
                    && let Some(controller) =
                        find_controller(&mut self.controllers, &mut self.draft, &target)
                {
                    controller.form_mut().show_pending_favorite(flag);
                }
                self.pending.insert(target);
                self.status.set_error(None);
            }
            Some(message) => {
                self.status.set_error(Some(message));
                if let Some(controller) =
                    find_controller(&mut self.controllers, &mut self.draft, &target)
                {
                    controller.shake(at.mono);
                }
            }
        }
    }

    fn on_response(&mut self, response: PersistenceResponse, at: Moment) {
        match response {
            PersistenceResponse::Created { point } => {
                self.pending.remove(&EditorKey::Draft);
                tracing::info!(id = %point.id, "Point created");
                if self.draft.is_some() {
                    self.discard_draft(at.wall);
                }
                if !self.collection.insert(point.clone()) {
                    tracing::warn!(id = %point.id, "Created point already listed; replacing");
                    self.collection.update(point);
                }
                self.status.set_error(None);
            }
            PersistenceResponse::Updated {
                point,
                favorite_only,
            } => {
                let key = EditorKey::Point(point.id.clone());
                self.pending.remove(&key);
                if !favorite_only
                    && let Some(controller) =
                        find_controller(&mut self.controllers, &mut self.draft, &key)
                {
                    controller.replace_form_with_card(&mut self.session);
                }
                if !self.collection.update(point) {
                    tracing::warn!(%key, "Updated point is no longer in the trip");
                }
                self.status.set_error(None);
            }
            PersistenceResponse::Deleted { id } => {
                self.pending.remove(&EditorKey::Point(id.clone()));
                tracing::info!(%id, "Point deleted");
                self.collection.remove(&id);
                self.status.set_error(None);
            }
            PersistenceResponse::Failed {
                target,
                favorite_only,
                error,
            } => {
                self.pending.remove(&target);
                self.status.set_error(Some(error.to_string()));
                match find_controller(&mut self.controllers, &mut self.draft, &target) {
                    Some(controller) => {
                        if favorite_only {
                            controller.form_mut().rollback_favorite();
                        }
                        controller.shake(at.mono);
                    }
                    None => tracing::warn!(%target, "Failure for a closed editor dropped"),
                }
            }
        }
    }

    /// Drain worker responses, collection notifications and timers.
    /// Returns true when something visible changed.
    pub fn poll(&mut self, at: Moment) -> bool {
        let mut changed = false;
        while let Some(response) = self.dispatcher.try_recv() {
            self.on_response(response, at);
            changed = true;
        }
        for controller in self.controllers.iter_mut().chain(self.draft.as_mut()) {
            changed |= controller.tick(at.mono);
        }
        self.sync(at.wall);
        changed
    }

    fn apply(&mut self, index: Option<usize>, event: ControllerEvent, at: Moment) {
        match event {
            ControllerEvent::None => {}
            ControllerEvent::OpenRequested => {
                if let Some(index) = index {
                    self.open(index, at.wall);
                }
            }
            ControllerEvent::Data(change) => self.on_data_change(change, at),
        }
    }

    pub fn handle_key(
        &mut self,
        key: &AppKeyEvent,
        keys: &KeybindingsConfig,
        at: Moment,
    ) -> EventResult {
        let result = self.route_key(key, keys, at);
        self.sync(at.wall);
        result
    }

    fn route_key(&mut self, key: &AppKeyEvent, keys: &KeybindingsConfig, at: Moment) -> EventResult {
        // An open editor gets every key; Escape goes to its listener
        if let Some(target) = self.session.open_editor().cloned() {
            let Some(controller) = find_controller(&mut self.controllers, &mut self.draft, &target)
            else {
                tracing::warn!(%target, "Escape listener without an editor");
                self.session.release_escape(&target);
                return EventResult::Handled;
            };
            let event = if KeybindingsConfig::matches(key, &keys.global.cancel) {
                controller.on_escape(&mut self.session)
            } else {
                controller.handle_key(key, keys, &mut self.session, at.wall)
            };
            self.apply(None, event, at);
            return EventResult::Handled;
        }

        let global = &keys.global;
        let nav = &keys.navigation;
        if KeybindingsConfig::matches(key, &global.quit) {
            return EventResult::Exit;
        }
        if KeybindingsConfig::matches(key, &global.new_point) {
            self.create_point(at.wall);
            return EventResult::Handled;
        }
        let filters = [
            (&global.filter_everything, FilterType::Everything),
            (&global.filter_future, FilterType::Future),
            (&global.filter_past, FilterType::Past),
        ];
        for (bindings, filter) in filters {
            if KeybindingsConfig::matches(key, bindings) {
                self.activate_filter(filter, at.wall);
                return EventResult::Handled;
            }
        }
        if KeybindingsConfig::matches(key, &nav.up) {
            self.selected = self.selected.saturating_sub(1);
            return EventResult::Handled;
        }
        if KeybindingsConfig::matches(key, &nav.down) {
            if self.selected + 1 < self.controllers.len() {
                self.selected += 1;
            }
            return EventResult::Handled;
        }

        let index = self.selected;
        let Some(controller) = self.controllers.get_mut(index) else {
            return EventResult::NotHandled;
        };
        let event = controller.handle_key(key, keys, &mut self.session, at.wall);
        if event == ControllerEvent::None {
            return EventResult::NotHandled;
        }
        self.apply(Some(index), event, at);
        EventResult::Handled
    }

    fn rows(&self) -> Vec<Row<'_>> {
        let mut rows = Vec::new();
        let editing = self.session.open_editor().is_some();
        if let Some(draft) = &self.draft {
            rows.push(Row::Editor {
                controller: draft,
                focused: true,
            });
        }

        let mut current_day = None;
        let mut day = 0;
        for (i, controller) in self.controllers.iter().enumerate() {
            let label = day_label(controller.point().start_date, &self.env.tz);
            if current_day.as_ref() != Some(&label) {
                day += 1;
                current_day = Some(label.clone());
                rows.push(Row::DayHeader { day, label });
            }
            let focused = match self.session.open_editor() {
                Some(key) => key == controller.key(),
                None => !editing && i == self.selected,
            };
            rows.push(Row::Editor {
                controller,
                focused,
            });
        }
        rows
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, keys: &KeybindingsConfig) {
        let rows = self.rows();
        if rows.is_empty() {
            let hint = KeybindingsConfig::hint(&keys.global.new_point);
            frame.render_widget(
                Paragraph::new(format!("Press {hint} to create your first point"))
                    .style(Style::default().fg(HELP_COLOR)),
                area,
            );
            return;
        }

        let heights: Vec<u16> = rows
            .iter()
            .map(|row| match row {
                Row::DayHeader { .. } => 1,
                Row::Editor { controller, .. } => controller.height(area.width),
            })
            .collect();
        let focused_row = rows
            .iter()
            .position(|row| matches!(row, Row::Editor { focused: true, .. }))
            .unwrap_or(0);

        // Scroll just enough to keep the focused row on screen
        let mut first = 0;
        let fits = |from: usize| heights[from..=focused_row].iter().sum::<u16>() <= area.height;
        while first < focused_row && !fits(first) {
            first += 1;
        }

        let mut y = area.y;
        let bottom = area.y + area.height;
        for (row, height) in rows.iter().zip(&heights).skip(first) {
            if y >= bottom {
                break;
            }
            let slot = Rect::new(area.x, y, area.width, (*height).min(bottom - y));
            match row {
                Row::DayHeader { day, label } => {
                    let line = Line::from(vec![
                        Span::styled(
                            format!("DAY {day}  "),
                            Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(label.clone(), Style::default().fg(HEADER_COLOR)),
                    ]);
                    frame.render_widget(Paragraph::new(line), slot);
                }
                Row::Editor {
                    controller,
                    focused,
                } => {
                    let ctx = RenderContext {
                        keys,
                        focused: *focused,
                    };
                    controller.render(frame, slot, &ctx);
                }
            }
            y += height;
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, keys: &KeybindingsConfig) {
        let ctx = RenderContext {
            keys,
            focused: false,
        };
        let [bar, list, status] = Layout::vertical([
            Constraint::Length(self.filters.bar().height()),
            Constraint::Min(0),
            Constraint::Length(self.status.height()),
        ])
        .areas(area);

        self.filters.bar().render(frame, bar, &ctx);
        self.render_list(frame, list, keys);
        self.status.render(frame, status, &ctx);
    }
}
