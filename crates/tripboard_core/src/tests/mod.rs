//! Scenario tests for the core library
//!
//! - `round_trip` - Wire conversion over whole data sets
//! - `persistence` - Backend writes feeding the events collection
