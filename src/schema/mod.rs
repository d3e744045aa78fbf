//! Schema module - Configuration, descriptor spaces and snapshot records.

mod config;
mod descriptor;
mod info;
mod snapshot;

pub use config::*;
pub use descriptor::*;
pub use info::*;
pub use snapshot::*;
