//! Transforms shipped with the `maltego-trx` binary.

pub mod lookup_ip;

pub use lookup_ip::LookupIp;

use crate::registry::{RegistryError, TransformRegistry};

/// A registry holding every built-in transform.
pub fn builtin() -> Result<TransformRegistry, RegistryError> {
    let mut registry = TransformRegistry::new();
    registry.register("lookupIP", LookupIp)?;
    Ok(registry)
}
