//! # fway
//!
//! A path-matching dispatcher for HTTP requests: one segment trie per
//! method, named `:wildcard` segments, automatic `OPTIONS` answers and a
//! replaceable 404.
//!
//! ## Matching rules
//!
//! - Paths are split on `/`; each segment is matched exactly and
//!   case-sensitively. Empty segments are ignored.
//! - A segment written `:name` at registration matches any single segment and
//!   binds it under `name`, readable through [`Request::param`].
//! - A literal segment is tried before the wildcard at the same position.
//!   Matching never backtracks into the wildcard once a literal was taken.
//! - Only nodes with a handler are routable. `/users` does not match a tree
//!   holding just `/users/:id`.
//! - Normalisation (trailing slashes, percent-decoding) is left to the caller.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use fway::{Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/:id",               get_user)
//!         .put("/users/:id",               update_user)
//!         .get("/users/:id/subscriptions", list_subscriptions);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn update_user(req: Request) -> StatusCode {
//!     if req.body().is_empty() {
//!         return StatusCode::BAD_REQUEST;
//!     }
//!     StatusCode::NO_CONTENT
//! }
//!
//! async fn list_subscriptions(req: Request) -> String {
//!     format!("subscriptions of {}", req.param("id").unwrap_or("?"))
//! }
//! ```
//!
//! `OPTIONS /users/42` now answers `204 No Content` with
//! `Access-Control-Allow-Methods: GET, PUT`, and `GET /users` answers
//! `404 - NOT FOUND` unless a handler is set with [`Router::not_found`].

mod error;
mod handler;
mod method;
mod node;
mod params;
mod request;
mod response;
mod router;
mod server;

pub use error::Error;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use params::Params;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
