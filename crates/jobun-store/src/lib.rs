//! jobun-store: durable backends for the quiz engine.
//!
//! Implements the `jobun-core` persistence and lookup traits over local
//! JSON documents and an optional HTTP article service, and carries the
//! application configuration.

pub mod bodies;
pub mod config;
pub mod history;
pub mod json;
pub mod memory;
