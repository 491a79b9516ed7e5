//! Shared library surface for the approach server and its tests.

pub mod api;
pub mod config;
pub mod state;
