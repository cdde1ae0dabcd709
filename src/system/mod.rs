//! System-level modules
//!
//! - Clock cache shared by the link registry and the sweeper
//! - Logging initialization

pub mod clock;
pub mod logging;

pub use clock::ClockCache;
pub use logging::init_logging;
