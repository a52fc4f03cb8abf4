//! Route registry and lookup.
//!
//! # Responsibilities
//! - Store compiled routes keyed by normalized path and method
//! - Resolve a request path to a handler plus bound parameters
//! - Return an explicit miss rather than a silent default
//!
//! # Design Decisions
//! - Built at startup, then published as an immutable snapshot (`SharedRoutes`)
//! - O(1) lookup via `HashMap<RouteKey, _>`
//! - Same key registered twice: last registration wins

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::http::handler::Handler;
use crate::http::Method;
use crate::routing::matcher::match_path;
use crate::routing::template::{RouteError, RouteKey, RouteTemplate};

/// Route table shared with connection tasks; swap in a new table atomically.
pub type SharedRoutes = Arc<ArcSwap<RouteTable>>;

struct RouteEntry {
    template: RouteTemplate,
    handler: Arc<dyn Handler>,
}

/// A successful lookup.
pub struct Resolved<'a> {
    pub handler: &'a dyn Handler,
    /// Template the request matched, as registered.
    pub template: &'a str,
    /// Integer path parameters, left to right.
    pub params: Vec<i64>,
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("template", &self.template)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<RouteKey, RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and register `handler` for `method`.
    pub fn register<H: Handler>(
        &mut self,
        template: &str,
        method: Method,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        let template = RouteTemplate::parse(template)?;
        let key = template.key(method);

        let entry = RouteEntry {
            template,
            handler: Arc::new(handler),
        };
        if let Some(previous) = self.routes.insert(key.clone(), entry) {
            tracing::warn!(
                key = %key,
                replaced = %previous.template,
                "Route registered twice, keeping the latest"
            );
        } else {
            tracing::debug!(key = %key, "Route registered");
        }

        Ok(self)
    }

    pub fn get<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.register(template, Method::Get, handler)
    }

    pub fn post<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.register(template, Method::Post, handler)
    }

    pub fn put<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.register(template, Method::Put, handler)
    }

    pub fn patch<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.register(template, Method::Patch, handler)
    }

    pub fn delete<H: Handler>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.register(template, Method::Delete, handler)
    }

    /// Look up the handler for a concrete path (query already stripped).
    pub fn resolve(&self, path: &str, method: Method) -> Option<Resolved<'_>> {
        let matched = match_path(path)?;
        let key = RouteKey::new(matched.normalized, method);

        self.routes.get(&key).map(|entry| Resolved {
            handler: entry.handler.as_ref(),
            template: entry.template.as_str(),
            params: matched.params,
        })
    }

    pub fn contains(&self, key: &RouteKey) -> bool {
        self.routes.contains_key(key)
    }

    /// Registered keys with their templates, sorted by key.
    pub fn routes(&self) -> Vec<(&RouteKey, &str)> {
        let mut routes: Vec<_> = self
            .routes
            .iter()
            .map(|(key, entry)| (key, entry.template.as_str()))
            .collect();
        routes.sort();
        routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the table into a shareable snapshot.
    pub fn into_shared(self) -> SharedRoutes {
        Arc::new(ArcSwap::from_pointee(self))
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes().iter().map(|(key, _)| key.to_string()))
            .finish()
    }
}
