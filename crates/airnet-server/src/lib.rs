//! Shared library surface for the network planning server and its tests.

pub mod api;
pub mod config;
pub mod state;
