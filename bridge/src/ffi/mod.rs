//! Python bindings

pub mod bridge;
pub mod logger;
pub mod types;
