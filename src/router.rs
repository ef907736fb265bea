//! Exact-match routing on `(method, path)`.
//!
//! The table is built before the server starts and is only read while
//! serving, so it is shared without locks.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::ServerError;
use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// A request handler.
///
/// Handlers run on the event loop thread; one that blocks stalls every
/// connection.
pub type Handler = Box<dyn Fn(&Request) -> anyhow::Result<Response> + Send + Sync>;

#[derive(Default)]
pub struct Router {
    routes: HashMap<String, Handler>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.routes.keys().collect();
        keys.sort();
        f.debug_struct("Router").field("routes", &keys).finish()
    }
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{} {}", method.as_str(), path)
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `method` and `path`, replacing any earlier binding.
    pub fn route<F>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        let key = route_key(&method, path);
        if self.routes.insert(key, Box::new(handler)).is_some() {
            tracing::debug!(%method, path, "Replaced existing route");
        }
        self
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Handler> {
        self.routes.get(&route_key(method, path))
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.lookup(method, path).is_some()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Runs the matching handler.
    ///
    /// A handler that returns an error or panics yields `HandlerFailure`; the
    /// panic does not escape.
    pub fn dispatch(&self, request: &Request) -> Result<Response, ServerError> {
        let handler = self
            .lookup(&request.method, &request.path)
            .ok_or_else(|| ServerError::NoRouteMatch {
                method: request.method.to_string(),
                path: request.path.clone(),
            })?;

        match catch_unwind(AssertUnwindSafe(|| handler(request))) {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ServerError::HandlerFailure(format!("{e:#}"))),
            Err(panic) => Err(ServerError::HandlerFailure(panic_message(panic.as_ref()))),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}
