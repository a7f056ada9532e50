//! Platform registry.
//!
//! Descriptors are static and initialized once. Strategies are per-instance
//! so an embedder (or a test) can swap in its own for any platform.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use watchlink_core::StreamingService;
use watchlink_fetch::{LinkStrategy, ResolveError};

use crate::descriptor::PlatformDescriptor;
use crate::platforms::{
    apple_tv_plus_descriptor, disney_plus_descriptor, hulu_descriptor, max_descriptor,
    netflix_descriptor, paramount_plus_descriptor, peacock_descriptor, prime_video_descriptor,
};
use crate::search::{SearchSettings, SearchStrategy};

// ============================================================================
// Static Descriptors
// ============================================================================

static DESCRIPTORS: OnceLock<Vec<PlatformDescriptor>> = OnceLock::new();

fn init_descriptors() -> Vec<PlatformDescriptor> {
    vec![
        netflix_descriptor(),
        disney_plus_descriptor(),
        prime_video_descriptor(),
        max_descriptor(),
        hulu_descriptor(),
        apple_tv_plus_descriptor(),
        paramount_plus_descriptor(),
        peacock_descriptor(),
    ]
}

// ============================================================================
// Platform Registry
// ============================================================================

/// Maps streaming services to the strategy that resolves them.
#[derive(Clone, Default)]
pub struct PlatformRegistry {
    strategies: HashMap<StreamingService, Arc<dyn LinkStrategy>>,
}

impl PlatformRegistry {
    /// Returns all built-in descriptors.
    pub fn descriptors() -> &'static [PlatformDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets the built-in descriptor for a service.
    pub fn descriptor(service: StreamingService) -> Option<&'static PlatformDescriptor> {
        Self::descriptors().iter().find(|d| d.service == service)
    }

    /// Creates a registry with no strategies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with a search strategy for every built-in platform.
    pub fn builtin(settings: SearchSettings) -> Self {
        let mut registry = Self::empty();
        for desc in Self::descriptors() {
            registry.register(
                desc.service,
                Arc::new(SearchStrategy::new(desc.clone(), settings)),
            );
        }
        registry
    }

    /// Registers (or replaces) the strategy for a service.
    pub fn register(&mut self, service: StreamingService, strategy: Arc<dyn LinkStrategy>) {
        debug!(service = %service, strategy = strategy.id(), "Registering strategy");
        self.strategies.insert(service, strategy);
    }

    /// Gets the strategy for a service.
    pub fn get(&self, service: StreamingService) -> Option<Arc<dyn LinkStrategy>> {
        self.strategies.get(&service).cloned()
    }

    /// Looks up a strategy by display name, slug or alias.
    ///
    /// Matching ignores case and collapses whitespace. Unknown names and
    /// known services without a strategy are both unsupported.
    pub fn lookup(
        &self,
        name: &str,
    ) -> Result<(StreamingService, Arc<dyn LinkStrategy>), ResolveError> {
        StreamingService::from_name(name)
            .and_then(|service| self.get(service).map(|strategy| (service, strategy)))
            .ok_or_else(|| ResolveError::UnsupportedService(name.to_string()))
    }

    /// Returns the registered services in canonical order.
    pub fn services(&self) -> Vec<StreamingService> {
        StreamingService::all()
            .iter()
            .copied()
            .filter(|s| self.strategies.contains_key(s))
            .collect()
    }

    /// Returns the number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if no strategy is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for PlatformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformRegistry")
            .field("services", &self.services())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
