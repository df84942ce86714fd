//! Handlers and the endpoints the router stores for them.
//!
//! Registration converts a handler into an [`Endpoint`] once. The trie keeps
//! `Arc<dyn Endpoint>` values, so routes of different handler types share one
//! node type. At dispatch the router hands the endpoint the request together
//! with the bindings the trie produced; the endpoint attaches them before the
//! user function sees the request.
//!
//! ```text
//! router.get("/users/:id", show)   → Arc<FnEndpoint<show>> in the GET tree
//! GET /users/42                    → endpoint.respond(req, {"id": "42"})
//!                                  → show(req with params).await.into_response()
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;

use crate::params::Params;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

const NOT_FOUND_BODY: &str = "404 - NOT FOUND";

/// Response future produced by an endpoint.
#[doc(hidden)]
pub type Responding = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// What the router calls for a matched route or for the not-found fallback.
#[doc(hidden)]
pub trait Endpoint: Send + Sync + 'static {
    fn respond(&self, req: Request, params: Params) -> Responding;
}

/// Shared handle to an endpoint, as stored in the trie.
#[doc(hidden)]
pub type SharedEndpoint = Arc<dyn Endpoint>;

/// Implemented for every valid route handler.
///
/// Any function or closure of the shape
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// qualifies. Wildcard values are read inside it with [`Request::param`].
pub trait Handler: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> SharedEndpoint;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_endpoint(self) -> SharedEndpoint {
        Arc::new(FnEndpoint(self))
    }
}

struct FnEndpoint<F>(F);

impl<F, Fut, R> Endpoint for FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn respond(&self, req: Request, params: Params) -> Responding {
        let pending = (self.0)(req.with_params(params));
        Box::pin(async move { pending.await.into_response() })
    }
}

/// The fallback used until [`Router::not_found`](crate::Router::not_found)
/// replaces it: `404`, `text/plain`, `404 - NOT FOUND`.
pub(crate) struct DefaultNotFound;

impl Endpoint for DefaultNotFound {
    fn respond(&self, _req: Request, _params: Params) -> Responding {
        Box::pin(async {
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .bytes("text/plain", NOT_FOUND_BODY.as_bytes().to_vec())
        })
    }
}
