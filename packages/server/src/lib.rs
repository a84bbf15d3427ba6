//! Public surface for the `maltego-server` crate.
//!
//! Exposes the registry, router builder and config types so that external
//! crates (e.g. the conformance test suite) can spin up an in-process server
//! without spawning a subprocess.

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod transforms;

pub use config::ServerConfig;
pub use registry::{RegistryError, TransformHandler, TransformRegistry};
pub use router::build_router;
