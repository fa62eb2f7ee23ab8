//! Command-line front end: configuration, wiring, and run reporting.

pub mod config;
pub mod error;
