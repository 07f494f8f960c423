//! Module registry - discovery, aggregation, and the composition root.
//!
//! [`ModuleRegistry::load`] folds each discovered module, in discovery
//! order, into the published module-info list, the route table, the action
//! list, the heartbeat provider list, and the client bundle. All of one
//! module's contributions register before the next module is touched, and
//! any failure aborts the whole load, so a successful load is a mutually
//! consistent snapshot.

mod actions;
mod loader;
mod module;
mod route_table;

pub use actions::ActionRegistry;
pub use loader::{ClientUnit, LoadedModule, ModuleLoader};
pub use module::{
    HandlerSpec, HostContext, ModuleCatalog, ModuleFactory, RealtimeContext, Route, RouteHandler,
    ServerModule,
};
pub use route_table::{RouteEntry, RouteTable};

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::{HeartbeatSample, LoadError, ModuleDescriptor, ProviderError};

/// A heartbeat provider and the module that owns it.
pub struct HeartbeatProvider {
    module: String,
    unit: Arc<dyn ServerModule>,
}

impl std::fmt::Debug for HeartbeatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatProvider")
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

impl HeartbeatProvider {
    /// Name of the owning module, for provider-failure logs.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Runs the provider against the shared sample for one tick.
    pub fn apply(&self, beat: &mut HeartbeatSample) -> Result<(), ProviderError> {
        self.unit.heartbeat(beat)
    }
}

/// Owns every module's merged contribution after a successful load.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    descriptors: Vec<ModuleDescriptor>,
    actions: ActionRegistry,
    routes: RouteTable,
    providers: Vec<HeartbeatProvider>,
    bundle: String,
}

impl ModuleRegistry {
    /// Discovers modules under `root` and folds them into one registry.
    ///
    /// # Errors
    ///
    /// Any discovery or registration failure aborts the load before any
    /// later module is processed.
    pub fn load(
        root: &Path,
        catalog: ModuleCatalog,
        host: HostContext,
        realtime: RealtimeContext,
    ) -> Result<Self, LoadError> {
        let loader = ModuleLoader::new(catalog, host, realtime);
        let loaded = loader.load_all(root)?;
        Self::from_modules(loaded)
    }

    /// Folds already-loaded modules into a registry, in the given order.
    pub fn from_modules(loaded: Vec<LoadedModule>) -> Result<Self, LoadError> {
        let mut registry = Self::default();
        let mut names = HashSet::new();

        for module in loaded {
            let name = module.descriptor.name.clone();
            if !names.insert(name.clone()) {
                return Err(LoadError::DuplicateModule { name });
            }
            registry.register(module)?;
        }

        info!(
            modules = registry.descriptors.len(),
            routes = registry.routes.len(),
            actions = registry.actions.len(),
            providers = registry.providers.len(),
            bundle_bytes = registry.bundle.len(),
            "module registry loaded"
        );
        Ok(registry)
    }

    /// Registers one module's full contribution.
    fn register(&mut self, module: LoadedModule) -> Result<(), LoadError> {
        let name = module.descriptor.name.clone();

        if let Some(unit) = &module.server {
            if unit.has_heartbeat() {
                self.providers.push(HeartbeatProvider {
                    module: name.clone(),
                    unit: unit.clone(),
                });
            }

            for route in unit.routes() {
                info!(module = %name, method = %route.method, path = %route.path, "adding route");
                let handler = match route.handler {
                    HandlerSpec::Handler(handler) => handler,
                    HandlerSpec::Named(handler_name) => {
                        unit.named_handler(&handler_name).ok_or_else(|| {
                            LoadError::invalid_handler(&name, route.method, route.path.clone())
                        })?
                    }
                };
                self.routes.push(RouteEntry {
                    module: name.clone(),
                    method: route.method,
                    path: route.path,
                    handler,
                });
            }
        }

        self.actions.extend(module.descriptor.actions.iter().cloned());

        if let Some(client) = &module.client {
            self.bundle.push_str(&client.render());
        }

        self.descriptors.push(module.descriptor);
        Ok(())
    }

    /// Published module-info list, in discovery order.
    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    /// The aggregated flat action list.
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// The aggregated route table, for the host HTTP layer to mount.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Heartbeat providers in registration order.
    pub fn providers(&self) -> &[HeartbeatProvider] {
        &self.providers
    }

    /// The concatenated client bundle served at `/pc/pc.modules.js`.
    pub fn bundle(&self) -> &str {
        &self.bundle
    }
}
