//! Keybindings configuration and matching.
//!
//! Bindings are lists of key specs such as `ctrl+s` or `shift+tab` and can be
//! overridden through `~/.tripboard/keybindings.yaml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::event::{AppKeyEvent, KeyCode};

/// Root keybindings configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    /// List keys; `cancel` also closes an open form
    pub global: GlobalBindings,
    /// List and form navigation
    pub navigation: NavigationBindings,
    /// Edit form actions
    pub form: FormBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalBindings {
    pub quit: Vec<String>,
    pub cancel: Vec<String>,
    pub new_point: Vec<String>,
    pub filter_everything: Vec<String>,
    pub filter_future: Vec<String>,
    pub filter_past: Vec<String>,
}

impl Default for GlobalBindings {
    fn default() -> Self {
        Self {
            quit: vec!["q".into(), "ctrl+c".into()],
            cancel: vec!["esc".into()],
            new_point: vec!["n".into()],
            filter_everything: vec!["1".into()],
            filter_future: vec!["2".into()],
            filter_past: vec!["3".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
    pub confirm: Vec<String>,
}

impl Default for NavigationBindings {
    fn default() -> Self {
        Self {
            up: vec!["k".into(), "up".into()],
            down: vec!["j".into(), "down".into()],
            left: vec!["left".into()],
            right: vec!["right".into()],
            next_field: vec!["tab".into()],
            prev_field: vec!["shift+tab".into()],
            confirm: vec!["enter".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormBindings {
    pub submit: Vec<String>,
    pub delete: Vec<String>,
    pub favorite: Vec<String>,
    pub rollup: Vec<String>,
    pub toggle: Vec<String>,
}

impl Default for FormBindings {
    fn default() -> Self {
        Self {
            submit: vec!["ctrl+s".into()],
            delete: vec!["ctrl+d".into()],
            favorite: vec!["ctrl+f".into()],
            rollup: vec!["ctrl+u".into()],
            toggle: vec!["space".into()],
        }
    }
}

impl KeybindingsConfig {
    /// Convert an AppKeyEvent to the string format used in bindings.
    ///
    /// Examples:
    /// - `Char('a')` -> "a"
    /// - `Char('s')` with ctrl -> "ctrl+s"
    /// - `Char('J')` with shift -> "shift+j"
    /// - `Char(' ')` -> "space"
    /// - `BackTab` -> "shift+tab"
    pub fn app_key_to_string(key: &AppKeyEvent) -> String {
        let mut parts = Vec::new();

        if key.ctrl {
            parts.push("ctrl");
        }
        if key.alt {
            parts.push("alt");
        }

        let key_str = match &key.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => {
                if key.shift && (c.is_uppercase() || !c.is_alphabetic()) {
                    parts.push("shift");
                }
                c.to_lowercase().to_string()
            }
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Delete => "delete".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab | KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                if key.shift {
                    parts.push("shift");
                }
                match key.code {
                    KeyCode::Tab => "tab",
                    KeyCode::Up => "up",
                    KeyCode::Down => "down",
                    KeyCode::Left => "left",
                    _ => "right",
                }
                .to_string()
            }
            KeyCode::BackTab => {
                if !parts.contains(&"shift") {
                    parts.push("shift");
                }
                "tab".to_string()
            }
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::PageUp => "pageup".to_string(),
            KeyCode::PageDown => "pagedown".to_string(),
            KeyCode::F(n) => format!("f{n}"),
            _ => return String::new(),
        };

        parts.push(&key_str);
        parts.join("+")
    }

    /// Check if an AppKeyEvent matches any of the configured bindings.
    pub fn matches(key: &AppKeyEvent, bindings: &[String]) -> bool {
        let key_str = Self::app_key_to_string(key);
        if key_str.is_empty() {
            return false;
        }
        bindings.iter().any(|b| b.eq_ignore_ascii_case(&key_str))
    }

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("keybindings.yaml")
    }

    /// Load keybindings from file, returning defaults if file doesn't exist or fails to parse.
    pub fn load_or_default(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_saphyr::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// First binding of a list, for help lines
    pub fn hint(bindings: &[String]) -> &str {
        bindings.first().map(String::as_str).unwrap_or("?")
    }
}
