//! Service layer
//!
//! Code generation, link creation/lookup and the background expiration sweep.
//! All of it is plain in-memory work shared by the HTTP handlers.

mod code_generator;
mod link_service;
mod sweeper;

pub use code_generator::{Alphabet, CodeGenerator};
pub use link_service::*;
pub use sweeper::{ExpirationSweeper, SweeperHandle};
