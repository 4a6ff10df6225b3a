//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and talks to presentation through the renderer boundary.

pub mod error;
pub mod renderer;
pub mod services;

pub use error::ApplicationError;
pub use renderer::{Intent, Outcome, Renderer};
pub use services::{EditEngine, EngineOptions};
