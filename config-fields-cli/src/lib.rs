//! Command-line front end for the config field schema transcoder.
//!
//! Stored module schemas can be decoded for inspection, re-encoded from a
//! descriptor list, or checked for drift from their canonical form.

pub mod cli;
pub mod commands;
pub mod settings;

pub use cli::{Cli, Commands};
pub use settings::{Overrides, Settings};
