//! Append-only aggregation of module-contributed routes.
//!
//! Duplicate (method, path) pairs are a module authoring error the running
//! system tolerates: every entry is kept, but only the first registered
//! handler per pair is mounted, so a request always reaches the first
//! registration. Hosts that scan handlers in registration order stop at the
//! first response; axum refuses duplicate routes outright, so first-match
//! is reproduced here by dedup at mount time.

use std::collections::HashSet;

use axum::extract::Request;
use axum::routing::{on, MethodFilter};
use axum::Router;
use tracing::warn;

use crate::domain::HttpVerb;

use super::module::RouteHandler;

fn method_filter(verb: HttpVerb) -> MethodFilter {
    match verb {
        HttpVerb::Get => MethodFilter::GET,
        HttpVerb::Post => MethodFilter::POST,
        HttpVerb::Put => MethodFilter::PUT,
        HttpVerb::Delete => MethodFilter::DELETE,
        HttpVerb::Patch => MethodFilter::PATCH,
    }
}

/// One registered route and the module that contributed it.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub module: String,
    pub method: HttpVerb,
    pub path: String,
    pub handler: RouteHandler,
}

/// Ordered table of every route contributed by every module.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RouteEntry) {
        self.entries.push(entry);
    }

    /// Every registered entry, duplicates included, in registration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries that will actually be mounted: the first registration
    /// per (method, path), in registration order.
    pub fn mountable_entries(&self) -> Vec<&RouteEntry> {
        let mut seen = HashSet::new();
        let mut mountable = Vec::new();
        for entry in &self.entries {
            if seen.insert((entry.method, entry.path.as_str())) {
                mountable.push(entry);
            } else {
                warn!(
                    module = %entry.module,
                    method = %entry.method,
                    path = %entry.path,
                    "duplicate route ignored, first registration wins"
                );
            }
        }
        mountable
    }

    /// Builds the axum router the host layer mounts.
    pub fn router(&self) -> Router {
        let mut router = Router::new();
        for entry in self.mountable_entries() {
            let handler = entry.handler.clone();
            router = router.route(
                &entry.path,
                on(method_filter(entry.method), move |req: Request| {
                    let handler = handler.clone();
                    async move { handler.call(req).await }
                }),
            );
        }
        router
    }
}
