//! Domain types shared across the host: module metadata, the heartbeat
//! sample, and the error taxonomy.

mod descriptor;
mod errors;
mod heartbeat;

pub use descriptor::{Action, HttpVerb, ModuleDescriptor};
pub use errors::{LoadError, ProviderError};
pub use heartbeat::HeartbeatSample;
