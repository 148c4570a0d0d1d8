//! Proximity Core - Domain models, ports, and configuration
//!
//! This crate contains the core domain types and port definitions for the
//! proximity feature query: reference systems, search areas, layer
//! descriptors, query outcomes, and the collaborator traits the query core
//! talks to.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{ProximityError, Result};
