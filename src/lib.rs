//! ephemeral-link - a memory-resident URL shortener with self-expiring links
//!
//! Short codes are drawn at random from a fixed alphabet and claimed atomically
//! in an in-memory registry. A background sweeper evicts links once they reach
//! the retention window, using a coarse clock cache refreshed once per second.
//!
//! # Architecture
//! - `system`: Clock cache and logging
//! - `storage`: The concurrent registry and its records
//! - `services`: Code generation, link service, expiration sweeper
//! - `api`: HTTP handlers, rate limiting, response types
//! - `config`: Configuration loading
//! - `runtime`: Startup, server mode, shutdown

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
