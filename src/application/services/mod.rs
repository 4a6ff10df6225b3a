//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services own their domain state and talk to the outside world through the
//! [`Renderer`](crate::application::renderer::Renderer) boundary.

mod engine;

pub use engine::{EditEngine, EngineOptions};
