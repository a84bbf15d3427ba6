//! Named transform handlers.
//!
//! A [`TransformRegistry`] is filled once at start-up and then shared
//! read-only behind an `Arc`. Each registered name is served at
//! `/run/{name}`.

use std::sync::Arc;

use async_trait::async_trait;
use maltego::{Transform, TransformError};

// ---------------------------------------------------------------------------
// TransformHandler
// ---------------------------------------------------------------------------

/// The body of a transform.
///
/// The handler reads the request through [`Transform::input_entity`] and
/// friends and stages its reply on the same [`Transform`]. Returning an error
/// turns into a `FatalError` UI message for the analyst; the HTTP exchange
/// itself still succeeds.
#[async_trait]
pub trait TransformHandler: Send + Sync {
    async fn run(&self, transform: &mut Transform) -> Result<(), TransformError>;
}

/// Adapter for synchronous closures, see [`TransformRegistry::register_fn`].
struct FnHandler<F>(F);

#[async_trait]
impl<F> TransformHandler for FnHandler<F>
where
    F: Fn(&mut Transform) -> Result<(), TransformError> + Send + Sync,
{
    async fn run(&self, transform: &mut Transform) -> Result<(), TransformError> {
        (self.0)(transform)
    }
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("transform {0:?} is already registered")]
    Duplicate(String),

    /// Names become a single URL path segment.
    #[error("invalid transform name {0:?}: must be non-empty and contain no '/'")]
    InvalidName(String),
}

// ---------------------------------------------------------------------------
// TransformRegistry
// ---------------------------------------------------------------------------

/// Transform names and their handlers, in registration order.
#[derive(Default, Clone)]
pub struct TransformRegistry {
    entries: Vec<(String, Arc<dyn TransformHandler>)>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl TransformHandler + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() || name.contains('/') {
            return Err(RegistryError::InvalidName(name));
        }
        if self.get(&name).is_some() {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!(transform = %name, "registered");
        self.entries.push((name, Arc::new(handler)));
        Ok(())
    }

    /// Register a synchronous closure as a handler.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut Transform) -> Result<(), TransformError> + Send + Sync + 'static,
    {
        self.register(name, FnHandler(f))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TransformHandler>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| Arc::clone(h))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
