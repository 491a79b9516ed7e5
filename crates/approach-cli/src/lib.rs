//! Approach CLI - command line front end for the approach simulator.
//!
//! - render: plain-text tables for flights, snapshots and the reconciliation log
//! - scenarios: random roster generation

pub mod render;
pub mod scenarios;

pub use scenarios::{generate_roster, RosterSpec};
