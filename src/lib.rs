//! # Pattern Mux
//!
//! Pattern Mux is a small request router that drives a fresh handler object
//! through a fixed lifecycle for every request.
//!
//! Patterns are plain strings with `:name` variables. They are tried in the
//! order they were registered, and the first one that accepts the request
//! path wins. There is no radix tree and no priority rule to learn: if two
//! patterns could both match, register the specific one first.
//!
//! ## Features
//!
//! **Handler objects:** Each route is backed by a factory. Every request gets
//! its own handler, so per-request state can live in plain fields. A handler
//! implements only the methods it supports; the rest answer
//! `405 Method Not Allowed`. `HEAD` falls back to `GET` with the body
//! stripped.
//!
//! **Lifecycle hooks:** `setup`, `prepare`, `finish` and `teardown` run
//! around method dispatch, and middleware can answer a request before the
//! handler sees it or rewrite the response afterwards.
//!
//! **Fault containment:** A panic inside a handler never takes the server
//! down. It is logged and turned into the handler's `error_handler` response,
//! and `finish` still runs.
//!
//! **Trailing slash redirects:** With `append_slash` set, registering `/blog/`
//! also makes `/blog` redirect there permanently, query string included.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pattern_mux::{async_trait, Handler, Request, Response, Router, Settings};
//!
//! #[derive(Default)]
//! struct Index;
//!
//! #[async_trait]
//! impl Handler for Index {
//!     async fn get(&mut self, _: &mut Request) -> Response {
//!         Response::with_body("Hello, World!")
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn get(&mut self, req: &mut Request) -> Response {
//!         Response::with_body(format!("Hello, {}", req.param("user").unwrap_or_default()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> pattern_mux::Result<()> {
//!     let settings = Settings {
//!         append_slash: true,
//!         ..Settings::default()
//!     };
//!
//!     let router = Router::new(settings)
//!         .pattern("/", Index::default)
//!         .pattern("/hello/:user", Hello::default);
//!
//!     pattern_mux::listen_and_serve(router).await
//! }
//! ```
//!
//! ### Named variables
//!
//! As you can see, `:user` is a *named variable*. Its value is available via
//! [`Request::param`] or, under the key `:user`, via [`Request::params`].
//!
//! A variable runs until the pattern byte that follows it, or the next `/`:
//!
//! ```ignore
//! Pattern: /user/:user
//!
//!  /user/gordon              match
//!  /user/you                 match
//!  /user/gordon/profile      no match
//!  /user/                    no match
//!
//! Pattern: /files/:name.:ext
//!
//!  /files/report.pdf         match: :name="report", :ext="pdf"
//! ```
//!
//! ### Prefix patterns
//!
//! A pattern ending in `/` also matches every path below it:
//!
//! ```ignore
//! Pattern: /static/
//!
//!  /static/                  match
//!  /static/css/site.css      match
//!  /static                   no match
//! ```
//!
//! The bare `/` pattern is the exception: it only matches `/`.
//!
//! ### Not Found Handler
//!
//! Requests no pattern matches go to the not-found handler, which answers
//! `GET` with a `404`. It can be replaced:
//!
//! ```rust
//! use pattern_mux::{async_trait, Handler, Request, Response, Router};
//! use hyper::StatusCode;
//!
//! #[derive(Default)]
//! struct Missing;
//!
//! #[async_trait]
//! impl Handler for Missing {
//!     async fn get(&mut self, _: &mut Request) -> Response {
//!         Response::with_body("Sorry... nothing here").with_status(StatusCode::NOT_FOUND)
//!     }
//! }
//!
//! let router = Router::default().not_found(Missing::default);
//! ```

#![forbid(unsafe_code)]

mod error;
mod handler;
mod middleware;
mod params;
mod pipeline;
mod request;
mod response;
mod settings;

pub mod matcher;
pub mod path;
pub mod redirect;

#[doc(hidden)]
pub mod router;

pub use error::{Error, Result};
pub use handler::{Handler, HandlerFactory, NotFoundHandler};
pub use middleware::Middleware;
pub use params::{Param, Params};
pub use request::Request;
pub use response::{write_response, Response, DEFAULT_CONTENT_TYPE};
pub use settings::Settings;

#[doc(inline)]
pub use router::{listen_and_serve, Lookup, PatternEntry, Router};

#[doc(no_inline)]
pub use async_trait::async_trait;
