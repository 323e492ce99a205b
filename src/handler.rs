//! The handler capability contract.
//!
//! Every route is backed by a [`HandlerFactory`], which builds a fresh
//! [`Handler`] for each request it serves. A handler only needs to implement
//! the methods it supports; everything else falls back to the defaults
//! defined here:
//!
//! ```rust
//! use pattern_mux::{async_trait, Handler, Request, Response};
//!
//! #[derive(Default)]
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn get(&mut self, req: &mut Request) -> Response {
//!         Response::with_body(format!("Hello, {}!", req.param("name").unwrap_or("world")))
//!     }
//! }
//! ```
use crate::redirect;
use crate::request::Request;
use crate::response::Response;

use async_trait::async_trait;
use hyper::StatusCode;

/// A per-request handler.
///
/// The method handlers all default to `405 Method Not Allowed`, the hooks to
/// no-ops and the error handler to `500 Internal Server Error`.
#[async_trait]
pub trait Handler: Send {
    /// Runs first, before any middleware sees the request.
    fn setup(&mut self) {}

    /// Runs last, once [`setup`](Handler::setup) has run, however the
    /// request ended.
    fn teardown(&mut self) {}

    /// Runs before method dispatch. Returning a response ends the request
    /// with it; the method handler is then skipped.
    async fn prepare(&mut self, _req: &mut Request) -> Option<Response> {
        None
    }

    /// Runs whenever [`prepare`](Handler::prepare) returned, even if a later
    /// step failed. `res` is the response as it stood at that point.
    async fn finish(&mut self, _req: &Request, _res: &Response) {}

    async fn head(&mut self, _req: &mut Request) -> Response {
        Response::method_not_allowed()
    }

    async fn get(&mut self, _req: &mut Request) -> Response {
        Response::method_not_allowed()
    }

    async fn post(&mut self, _req: &mut Request) -> Response {
        Response::method_not_allowed()
    }

    async fn put(&mut self, _req: &mut Request) -> Response {
        Response::method_not_allowed()
    }

    async fn patch(&mut self, _req: &mut Request) -> Response {
        Response::method_not_allowed()
    }

    async fn delete(&mut self, _req: &mut Request) -> Response {
        Response::method_not_allowed()
    }

    async fn options(&mut self, _req: &mut Request) -> Response {
        Response::method_not_allowed()
    }

    /// Builds the response for a request that failed. `error` describes what
    /// went wrong.
    fn error_handler(&mut self, _error: &str) -> Response {
        Response::server_error()
    }

    fn permanent_redirect(&self, req: &Request, target: &str) -> Response {
        redirect::permanent(req, target)
    }

    fn temporary_redirect(&self, req: &Request, target: &str) -> Response {
        redirect::temporary(req, target)
    }
}

/// Builds the handler for a single request.
///
/// This is implemented for every function or closure returning a [`Handler`],
/// so `Hello::default` or `|| Hello { .. }` can be registered directly.
pub trait HandlerFactory: Send + Sync + 'static {
    fn new_handler(&self) -> Box<dyn Handler>;
}

impl<F, H> HandlerFactory for F
where
    F: Fn() -> H + Send + Sync + 'static,
    H: Handler + 'static,
{
    fn new_handler(&self) -> Box<dyn Handler> {
        Box::new(self())
    }
}

/// The handler used when no pattern matches.
#[derive(Debug, Default)]
pub struct NotFoundHandler;

#[async_trait]
impl Handler for NotFoundHandler {
    async fn get(&mut self, _req: &mut Request) -> Response {
        Response::with_body("Page not found")
            .with_status(StatusCode::NOT_FOUND)
            .with_content_type("text/plain")
    }
}
