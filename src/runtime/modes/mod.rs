//! Mode routing
//!
//! - Server mode (HTTP server, default)
//! - Config generation (writes a sample `config.toml`)

pub mod config_gen;
pub mod server;

pub use config_gen::generate_config;
pub use server::run_server;
