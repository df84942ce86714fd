//! Per-method segment-trie request router.
//!
//! One tree per HTTP method, created on the first registration for that
//! method. A method table on the side records which methods exist for each
//! route path, so `OPTIONS` can be answered without a registered handler.
//!
//! Build the router once at startup, then share it read-only between
//! connections (the server wraps it in an `Arc`). Nothing here locks: adding
//! routes while serving would need an external `RwLock` around the router.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::{debug, trace};

use crate::error::Error;
use crate::handler::{DefaultNotFound, Handler, SharedEndpoint};
use crate::method::{self, AllowedMethods};
use crate::node::Node;
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Registration chains, dispatch is [`Router::serve`]:
///
/// ```rust
/// use fway::{Request, Response, Router};
///
/// # async fn show_user(_: Request) -> Response { Response::text("") }
/// # async fn update_user(_: Request) -> Response { Response::text("") }
/// let app = Router::new()
///     .get("/users/:id", show_user)
///     .put("/users/:id", update_user);
/// ```
pub struct Router {
    trees: BTreeMap<String, Node<SharedEndpoint>>,
    allowed: HashMap<String, AllowedMethods>,
    not_found: SharedEndpoint,
    handle_options: bool,
    options_fallback: Option<String>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            trees: BTreeMap::new(),
            allowed: HashMap::new(),
            not_found: Arc::new(DefaultNotFound),
            handle_options: true,
            options_fallback: None,
        }
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Registers `handler` for `method` and `path`.
    ///
    /// `method` is case-insensitive. Path segments starting with `:` are
    /// wildcards: `/users/:id` matches `/users/42` and binds `id = "42"`.
    /// Registering the same method and path again replaces the handler.
    ///
    /// Fails on a blank or malformed method, a path not starting with `/`,
    /// a nameless `:` segment, or a wildcard whose name differs from one
    /// already registered at the same position. A failed registration
    /// changes nothing.
    pub fn handle(&mut self, method: &str, path: &str, handler: impl Handler) -> Result<(), Error> {
        let method = method::canonicalize(method)?;
        let handler = handler.into_endpoint();

        let full_path = match self.trees.get_mut(method.as_str()) {
            Some(tree) => tree.insert(path, handler)?.to_owned(),
            None => {
                let mut tree = Node::root();
                let full_path = tree.insert(path, handler)?.to_owned();
                self.trees.insert(method.as_str().to_owned(), tree);
                full_path
            }
        };

        debug!(method = %method, path = %full_path, "route registered");
        self.allowed.entry(full_path).or_default().insert(&method);
        Ok(())
    }

    /// Registers a handler and returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if the route is rejected by [`Router::handle`]. Routes are
    /// fixed at startup, so a bad one is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        if let Err(e) = self.handle(method.as_str(), path, handler) {
            panic!("cannot register {method} {path}: {e}");
        }
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    pub fn head(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::HEAD, path, handler)
    }

    /// Replaces the built-in 404 responder.
    pub fn set_not_found(&mut self, handler: impl Handler) {
        self.not_found = handler.into_endpoint();
    }

    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.set_not_found(handler);
        self
    }

    // ── Configuration ────────────────────────────────────────────────────────

    /// Answer `OPTIONS` automatically from the method table. On by default.
    ///
    /// When off, `OPTIONS` requests are routed like any other method.
    pub fn handle_options(mut self, enabled: bool) -> Self {
        self.handle_options = enabled;
        self
    }

    /// Allowed-methods value sent for `OPTIONS` on a path no tree matches,
    /// e.g. `"*"`. By default no header is sent in that case.
    pub fn options_fallback(mut self, value: impl Into<String>) -> Self {
        self.options_fallback = Some(value.into());
        self
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Routes one request and produces its response.
    ///
    /// Never fails: a request without a matching route gets the not-found
    /// handler's response.
    pub async fn serve(&self, req: Request) -> Response {
        if self.handle_options && req.method == Method::OPTIONS {
            return self.options(req.path());
        }

        match self.lookup(&req.method, req.path()) {
            Some((endpoint, params)) => {
                trace!(method = %req.method, path = req.path(), "route matched");
                endpoint.respond(req, params).await
            }
            None => self.fallback(req).await,
        }
    }

    /// The comma-separated methods registered for the route `path` resolves
    /// to, taken from the first method tree (in method-name order) that
    /// matches it.
    ///
    /// The table is keyed by the route as written, wildcard names included.
    /// With `GET /a/:id` and `PUT /a/:key` those are two routes, so
    /// `/a/7` reports only the methods of the route found first (`GET`).
    pub fn allowed_methods(&self, path: &str) -> Option<String> {
        self.trees
            .values()
            .find_map(|tree| tree.search(path))
            .and_then(|(node, _)| self.allowed.get(node.full_path()))
            .map(ToString::to_string)
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Option<(&SharedEndpoint, Params)> {
        let tree = self.trees.get(method.as_str())?;
        let (node, params) = tree.search(path)?;
        Some((node.handler()?, params))
    }

    fn options(&self, path: &str) -> Response {
        let allowed = self.allowed_methods(path).or_else(|| self.options_fallback.clone());

        let mut res = Response::builder().status(StatusCode::NO_CONTENT);
        if let Some(allowed) = allowed {
            res = res
                .header("access-control-allow-methods", &allowed)
                .header("allow", &allowed);
        }
        res.no_body()
    }

    /// The not-found endpoint never sees bindings from a partial match.
    async fn fallback(&self, req: Request) -> Response {
        debug!(method = %req.method, path = req.path(), "no route matched");
        self.not_found.respond(req, Params::new()).await
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Dumps every method tree, in method-name order, for debugging.
impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (method, tree) in &self.trees {
            writeln!(f, "{method}")?;
            write!(f, "{tree}")?;
        }
        Ok(())
    }
}
