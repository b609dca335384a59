//! Airnet CLI - command line front end for the network planning engine.
//!
//! The `airnet` binary loads a data directory once and runs one subcommand:
//! carriers, network, economics, scores, corridors, suggest, assign,
//! rank-aircraft or demand.

pub mod commands;
pub mod fleet_arg;
pub mod output;

pub use commands::{run, Cli, Command};

#[cfg(test)]
mod tests;
