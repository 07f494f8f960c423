//! The module capability interface and registration-time plumbing.
//!
//! Modules implement a fixed capability set instead of being loaded
//! reflectively: a server unit can expose routes, a heartbeat provider, and
//! named handlers that routes may reference by string. The loader constructs
//! each unit through a [`ModuleCatalog`] factory that receives the host and
//! realtime contexts.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;

use crate::config::AppConfig;
use crate::domain::{HeartbeatSample, HttpVerb, LoadError, ProviderError};
use crate::realtime::ConnectionSet;

/// Boxed future produced by a route handler call.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A concrete, callable route handler stored in the route table.
///
/// Handlers are resolved at registration time; by the time the route table
/// is mounted every entry holds one of these, never an unresolved name.
#[derive(Clone)]
pub struct RouteHandler(Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>);

impl RouteHandler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self(Arc::new(move |req| Box::pin(f(req))))
    }

    pub async fn call(&self, req: Request) -> Response {
        (self.0)(req).await
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RouteHandler")
    }
}

/// How a route names its handler: a concrete callable, or the name of a
/// callable owned by the module unit, resolved at registration time.
#[derive(Debug, Clone)]
pub enum HandlerSpec {
    Handler(RouteHandler),
    Named(String),
}

impl HandlerSpec {
    /// Convenience constructor wrapping a closure.
    pub fn handler<F, Fut>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        HandlerSpec::Handler(RouteHandler::new(f))
    }

    pub fn named(name: impl Into<String>) -> Self {
        HandlerSpec::Named(name.into())
    }
}

/// One route contributed by a server module unit.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: HttpVerb,
    pub path: String,
    pub handler: HandlerSpec,
}

/// Host application context injected into module factories.
#[derive(Clone)]
pub struct HostContext {
    pub config: Arc<AppConfig>,
}

/// Realtime transport context injected into module factories.
///
/// Gives modules a handle to the connection set so they can push events
/// outside the heartbeat cycle.
#[derive(Clone)]
pub struct RealtimeContext {
    pub connections: Arc<ConnectionSet>,
}

/// The live, server-side unit of one module.
///
/// All capabilities are optional; the defaults contribute nothing. Units are
/// owned by the registry for the life of the process.
pub trait ServerModule: Send + Sync {
    /// Routes this module contributes, in the order they should register.
    fn routes(&self) -> Vec<Route> {
        Vec::new()
    }

    /// Whether this module contributes a heartbeat provider.
    fn has_heartbeat(&self) -> bool {
        false
    }

    /// Mutates the shared heartbeat sample for one tick.
    ///
    /// Called once per tick in registration order; a later module may
    /// overwrite keys an earlier one set. Implementations must not retain
    /// the sample beyond the call.
    fn heartbeat(&self, _beat: &mut HeartbeatSample) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Resolves a handler this module owns by name.
    fn named_handler(&self, _name: &str) -> Option<RouteHandler> {
        None
    }
}

/// Factory producing one module's server unit from the injected contexts.
pub type ModuleFactory =
    Arc<dyn Fn(&HostContext, &RealtimeContext) -> Result<Arc<dyn ServerModule>, LoadError> + Send + Sync>;

/// Registry of module factories, keyed by descriptor name.
///
/// A discovered module directory whose name has no catalog entry simply
/// contributes no server unit (it may still ship client code).
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&HostContext, &RealtimeContext) -> Result<Arc<dyn ServerModule>, LoadError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Instantiates the server unit for `name`, if a factory is registered.
    pub fn instantiate(
        &self,
        name: &str,
        host: &HostContext,
        realtime: &RealtimeContext,
    ) -> Option<Result<Arc<dyn ServerModule>, LoadError>> {
        self.factories
            .get(name)
            .map(|factory| (factory.as_ref())(host, realtime))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
