use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};

use crate::components::EventResult;
use crate::config::KeybindingsConfig;
use crate::controllers::{Moment, TripController};
use crate::event::AppKeyEvent;

/// How long to wait for input before servicing timers and responses
const TICK: Duration = Duration::from_millis(50);

pub struct App {
    trip: TripController,
    keys: KeybindingsConfig,
    exit: bool,
}

impl App {
    pub fn new(trip: TripController, keys: KeybindingsConfig) -> Self {
        Self {
            trip,
            keys,
            exit: false,
        }
    }

    /// runs the application's main loop until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut dirty = true;
        while !self.exit {
            if dirty {
                terminal.draw(|frame| self.draw(frame))?;
            }
            dirty = self.handle_events()?;
            dirty |= self.trip.poll(Moment::now());
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        self.trip.render(frame, frame.area(), &self.keys);
    }

    /// Returns true when the screen needs a redraw.
    fn handle_events(&mut self) -> color_eyre::Result<bool> {
        if !event::poll(TICK)? {
            return Ok(false);
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(AppKeyEvent::from(key_event));
                Ok(true)
            }
            Event::Resize(..) => Ok(true),
            _ => Ok(false),
        }
    }

    pub fn handle_key_event(&mut self, key: AppKeyEvent) {
        // Ctrl+C leaves even while a form holds the keyboard
        if key.ctrl && key.code == KeyCode::Char('c') {
            self.exit = true;
            return;
        }
        if self.trip.handle_key(&key, &self.keys, Moment::now()) == EventResult::Exit {
            tracing::info!("Quit requested");
            self.exit = true;
        }
    }
}
