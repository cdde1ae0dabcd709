pub mod models;
pub mod registry;

pub use models::{Record, SweepReport};
pub use registry::{Registry, SweepView};
