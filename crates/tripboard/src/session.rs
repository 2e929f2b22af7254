//! Edit session shared by every controller of a trip.
//!
//! Tracks which editor currently owns the Escape key and whether a new
//! point may be started. At most one editor is registered at a time.

use std::fmt;

use tripboard_core::PointId;

/// Identifies an editor: a stored point, or the draft being added
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditorKey {
    Point(PointId),
    Draft,
}

impl fmt::Display for EditorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorKey::Point(id) => write!(f, "point {id}"),
            EditorKey::Draft => f.write_str("draft"),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    escape_listener: Option<EditorKey>,
    create_enabled: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            escape_listener: None,
            create_enabled: true,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route Escape to `key`, replacing any previous listener.
    pub fn listen_escape(&mut self, key: EditorKey) {
        if let Some(previous) = self.escape_listener.replace(key) {
            tracing::debug!(%previous, "Escape listener replaced");
        }
    }

    /// Drop the listener, but only if `key` still owns it.
    pub fn release_escape(&mut self, key: &EditorKey) {
        if self.escape_listener.as_ref() == Some(key) {
            self.escape_listener = None;
        }
    }

    /// Editor currently open, if any
    pub fn open_editor(&self) -> Option<&EditorKey> {
        self.escape_listener.as_ref()
    }

    pub fn is_create_enabled(&self) -> bool {
        self.create_enabled
    }

    pub fn set_create_enabled(&mut self, enabled: bool) {
        self.create_enabled = enabled;
    }
}
