//! Built-in modules shipped with the host.

mod statistics;

pub use statistics::Statistics;

use std::sync::Arc;

use crate::registry::{ModuleCatalog, ServerModule};

/// Catalog of every built-in module factory, keyed by descriptor name.
pub fn builtin_catalog() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    catalog.register("Statistics", |_host, _realtime| {
        Ok(Arc::new(Statistics::new()) as Arc<dyn ServerModule>)
    });
    catalog
}
