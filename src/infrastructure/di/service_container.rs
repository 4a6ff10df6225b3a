//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::{EditEngine, EngineOptions};
use crate::config::Settings;
use crate::infrastructure::persistence::MindMapStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding application settings and I/O boundaries.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    pub fn store(&self) -> MindMapStore {
        MindMapStore::new(Arc::clone(&self.fs))
    }

    /// Fresh engine configured from the settings.
    pub fn engine(&self) -> EditEngine {
        EditEngine::new(self.engine_options())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::from(self.settings.as_ref())
    }
}
