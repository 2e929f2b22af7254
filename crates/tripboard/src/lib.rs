//! Terminal trip planner
//!
//! Shows a trip as a day-grouped list of points and lets the user:
//! - Filter the list by Everything / Future / Past
//! - Open one point at a time in an edit form
//! - Add, update, favorite and delete points
//!
//! Writes go through a background persistence worker. The on-screen trip
//! only changes once the backend confirms a write; failures leave the form
//! open and shake it.

#![warn(clippy::all)]

// ============================================================================
// Application shell
// ============================================================================

pub mod app;
pub mod config;
pub mod event;
pub mod logging;

// ============================================================================
// Views and controllers
// ============================================================================

pub mod components;
pub mod controllers;
pub mod session;
pub mod util;

// ============================================================================
// Persistence
// ============================================================================

pub mod worker;

#[cfg(test)]
mod tests;

pub use app::App;
pub use logging::init_logging;
