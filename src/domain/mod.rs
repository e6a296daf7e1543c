//! Domain layer for the autopilot engine
//!
//! This module contains the campaign and experiment models, the domain error
//! type, and the ports that storage and content adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
