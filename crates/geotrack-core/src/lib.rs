//! GeoTrack Core - Domain models, decoding, and configuration
//!
//! This crate contains the core domain types and port definitions for the
//! GeoTrack system. It performs no I/O apart from reading and writing the
//! configuration file.

pub mod config;
pub mod error;
pub mod models;
pub mod nmea;
pub mod ports;

pub use error::{GeotrackError, Result};
