//! End-to-end tests of the trip controller
//!
//! Tests are organized by topic:
//! - `editing` - Opening forms, updates, deletes and favorites
//! - `adding` - Draft creation and discarding
//!
//! Requests are answered by a scripted dispatcher backed by a
//! [`MemoryBackend`], so a test decides exactly when a response lands.

mod editing;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use jiff::Timestamp;
use jiff::tz::TimeZone;
use tripboard_core::error::DateError;
use tripboard_core::{Backend, MemoryBackend};

use crate::components::date_picker::{DatePicker, PickerConfig, PickerFactory, TextDatePicker};
use crate::components::edit_form::FormEnv;
use crate::config::KeybindingsConfig;
use crate::controllers::{Moment, TripController};
use crate::event::{AppKeyEvent, KeyCode};
use crate::worker::{Dispatcher, PersistenceRequest, PersistenceResponse, execute};

/// Dispatcher that holds requests until the test releases them
#[derive(Default)]
pub struct ScriptedDispatcher {
    pub backend: MemoryBackend,
    sent: RefCell<Vec<PersistenceRequest>>,
    queued: RefCell<VecDeque<PersistenceRequest>>,
    responses: RefCell<VecDeque<PersistenceResponse>>,
}

impl ScriptedDispatcher {
    pub fn sent(&self) -> Vec<PersistenceRequest> {
        self.sent.borrow().clone()
    }

    /// Run every queued request against the backend.
    pub fn complete_all(&self) {
        while let Some(request) = self.queued.borrow_mut().pop_front() {
            if let Some(response) = execute(&self.backend, request) {
                self.responses.borrow_mut().push_back(response);
            }
        }
    }
}

impl Dispatcher for Rc<ScriptedDispatcher> {
    fn send(&self, request: PersistenceRequest) -> bool {
        self.sent.borrow_mut().push(request.clone());
        self.queued.borrow_mut().push_back(request);
        true
    }

    fn try_recv(&self) -> Option<PersistenceResponse> {
        self.responses.borrow_mut().pop_front()
    }
}

/// Text picker that tracks how many pickers are alive
struct CountingPicker {
    inner: TextDatePicker,
    live: Rc<Cell<usize>>,
}

impl DatePicker for CountingPicker {
    fn text(&self) -> &str {
        self.inner.text()
    }

    fn cursor(&self) -> usize {
        self.inner.cursor()
    }

    fn value(&self) -> Result<Timestamp, DateError> {
        self.inner.value()
    }

    fn handle_key(&mut self, key: &AppKeyEvent) -> bool {
        self.inner.handle_key(key)
    }

    fn destroy(&mut self) {
        if self.inner.is_live() {
            self.live.set(self.live.get() - 1);
        }
        self.inner.destroy();
    }

    fn is_live(&self) -> bool {
        self.inner.is_live()
    }
}

#[derive(Default)]
pub struct CountingPickers {
    live: Rc<Cell<usize>>,
}

impl CountingPickers {
    pub fn live(&self) -> usize {
        self.live.get()
    }
}

impl PickerFactory for CountingPickers {
    fn create(&self, config: PickerConfig, initial: &str, tz: &TimeZone) -> Box<dyn DatePicker> {
        self.live.set(self.live.get() + 1);
        Box::new(CountingPicker {
            inner: TextDatePicker::new(config, initial, tz),
            live: Rc::clone(&self.live),
        })
    }
}

/// Trip over the bundled sample, with handles on its collaborators
pub struct Harness {
    pub trip: TripController,
    pub dispatcher: Rc<ScriptedDispatcher>,
    pub pickers: Rc<CountingPickers>,
    pub keys: KeybindingsConfig,
    pub at: Moment,
}

impl Harness {
    pub fn new() -> Self {
        let backend = MemoryBackend::sample().unwrap();
        let points = backend.load_points().unwrap();
        let catalog = backend.load_catalog().unwrap();
        let dispatcher = Rc::new(ScriptedDispatcher {
            backend,
            ..Default::default()
        });
        let pickers = Rc::new(CountingPickers::default());
        let env = FormEnv::new(catalog, TimeZone::UTC, Duration::from_millis(600))
            .with_pickers(pickers.clone());
        let at = Moment {
            wall: "2024-01-01T00:00:00Z".parse().unwrap(),
            mono: Instant::now(),
        };
        let trip = TripController::new(points, env, Box::new(Rc::clone(&dispatcher)), at.wall);
        Self {
            trip,
            dispatcher,
            pickers,
            keys: KeybindingsConfig::default(),
            at,
        }
    }

    pub fn press(&mut self, key: AppKeyEvent) {
        self.trip.handle_key(&key, &self.keys, self.at);
    }

    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(AppKeyEvent::char(c));
        }
    }

    pub fn tab(&mut self, times: usize) {
        for _ in 0..times {
            self.press(AppKeyEvent::plain(KeyCode::Tab));
        }
    }

    /// Let the backend answer and run one UI tick.
    pub fn respond(&mut self) {
        self.dispatcher.complete_all();
        self.trip.poll(self.at);
    }

    pub fn advance(&mut self, by: Duration) {
        self.at.mono += by;
        self.trip.poll(self.at);
    }
}
