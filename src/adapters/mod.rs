//! Adapters implementing the domain ports.

pub mod content;
pub mod memory;
pub mod sqlite;
