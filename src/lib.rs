// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer

// Module declarations
pub mod backlog;
pub mod chat;
pub mod config;
pub mod events;
pub mod models;
pub mod parsers;
pub mod shutdown;
pub mod templates;
pub mod utils;

// Server module (HTTP/WebSocket API and copilot relay)
pub mod server;

pub use models::*;
