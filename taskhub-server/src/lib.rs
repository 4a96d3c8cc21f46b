//! `TaskHub` API server library.
//!
//! Exposes the HTTP server, task store, and user directory for use in
//! tests and embedding. The server answers authorization-scoped task
//! queries and mutations over a JSON HTTP API.

pub mod config;
pub mod directory;
pub mod server;
pub mod service;
pub mod store;
