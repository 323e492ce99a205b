//! [`Router`](crate::Router) is a first-match pattern router.
//!
//! Patterns are tried in the order they were registered and the first one
//! that accepts the request path wins. A request nothing matches goes to the
//! not-found handler.
//!
//! ```rust,no_run
//! use pattern_mux::{async_trait, Handler, Request, Response, Router};
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
//! struct User;
//!
//! #[async_trait]
//! impl Handler for User {
//!     async fn get(&mut self, req: &mut Request) -> Response {
//!         Response::with_body(format!("user {}", req.param("id").unwrap_or_default()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::default()
//!         .pattern("/", Index::default)
//!         .pattern("/user/:id", User::default);
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await;
//! }
//!```
//!
//! The registered pattern, against which the router matches request paths,
//! can contain named variables:
//! ```ignore
//!  Syntax    Type
//!  :name     named variable
//!  .../      prefix pattern (a trailing slash, except for the bare "/")
//! ```
//!
//! A named variable runs until the pattern byte that follows it, or the next
//! '/':
//! ```ignore
//!  Pattern: /blog/:category/:post
//!
//!   /blog/rust/request-routers            match: :category="rust", :post="request-routers"
//!   /blog/rust/request-routers/           no match
//!   /blog/rust/                           no match
//! ```
//!
//! See [`matcher`](crate::matcher) for the full rules.
use crate::error::Result;
use crate::handler::{HandlerFactory, NotFoundHandler};
use crate::matcher::try_match;
use crate::middleware::Middleware;
use crate::params::Params;
use crate::pipeline;
use crate::request::Request;
use crate::response::{write_response, Response};
use crate::settings::Settings;

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use arc_swap::ArcSwap;
use futures_util::future;
use hyper::server::conn::AddrStream;
use hyper::service::Service;
use hyper::Body;

/// A registered pattern and the factory of the handlers that serve it.
pub struct PatternEntry {
    pattern: String,
    factory: Arc<dyn HandlerFactory>,
    slash_redirect: bool,
}

impl PatternEntry {
    fn new(pattern: String, factory: Arc<dyn HandlerFactory>, slash_redirect: bool) -> Self {
        Self {
            pattern,
            factory,
            slash_redirect,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn factory(&self) -> &dyn HandlerFactory {
        &*self.factory
    }

    /// Whether this entry was added by `append_slash` and only redirects to
    /// the slashed form of the path.
    pub fn is_slash_redirect(&self) -> bool {
        self.slash_redirect
    }
}

impl fmt::Debug for PatternEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternEntry")
            .field("pattern", &self.pattern)
            .field("slash_redirect", &self.slash_redirect)
            .finish()
    }
}

/// The result of [`Router::lookup`].
#[derive(Debug)]
pub struct Lookup {
    pub entry: Arc<PatternEntry>,
    pub params: Params,
    /// `false` when `entry` is the not-found entry.
    pub matched: bool,
}

/// Router dispatches requests to handlers via an ordered table of patterns.
///
/// The table and the not-found entry are published as immutable snapshots,
/// so patterns may be registered through a shared reference while requests
/// are being served.
pub struct Router {
    table: ArcSwap<Vec<Arc<PatternEntry>>>,
    not_found: ArcSwap<PatternEntry>,
    middleware: Vec<Arc<dyn Middleware>>,
    settings: Settings,
}

impl Router {
    pub fn new(settings: Settings) -> Self {
        Self {
            table: ArcSwap::from_pointee(Vec::new()),
            not_found: ArcSwap::from_pointee(PatternEntry::new(
                String::new(),
                Arc::new(NotFoundHandler::default),
                false,
            )),
            middleware: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Appends `pattern` to the routing table.
    ///
    /// With `append_slash` enabled, a pattern ending in `/` also registers
    /// the pattern without it, redirecting to the slashed form.
    pub fn register(&self, pattern: impl Into<String>, factory: impl HandlerFactory) {
        let pattern = pattern.into();
        let factory: Arc<dyn HandlerFactory> = Arc::new(factory);

        let mut added = vec![Arc::new(PatternEntry::new(
            pattern.clone(),
            factory.clone(),
            false,
        ))];

        if self.settings.append_slash && pattern.ends_with('/') {
            let bare = pattern[..pattern.len() - 1].to_string();
            added.push(Arc::new(PatternEntry::new(bare, factory, true)));
        }

        self.table.rcu(|table| {
            let mut next = Vec::clone(table);
            next.extend(added.iter().cloned());
            next
        });

        tracing::debug!(pattern = %pattern, entries = added.len(), "registered pattern");
    }

    /// Registers a pattern, builder style.
    /// ```rust
    /// use pattern_mux::{Router, NotFoundHandler};
    ///
    /// let router = Router::default()
    ///     .pattern("/teapot", NotFoundHandler::default);
    ///
    /// assert!(router.lookup("/teapot").matched);
    /// ```
    pub fn pattern(self, pattern: impl Into<String>, factory: impl HandlerFactory) -> Self {
        self.register(pattern, factory);
        self
    }

    /// Replaces the handler used when no pattern matches.
    pub fn set_not_found(&self, factory: impl HandlerFactory) {
        self.not_found
            .store(Arc::new(PatternEntry::new(String::new(), Arc::new(factory), false)));
    }

    /// Configurable handler which is called when no matching pattern is
    /// found.
    pub fn not_found(self, factory: impl HandlerFactory) -> Self {
        self.set_not_found(factory);
        self
    }

    /// Adds a middleware. Middleware runs in the order it was added.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// The current routing table, in registration order.
    pub fn entries(&self) -> Arc<Vec<Arc<PatternEntry>>> {
        self.table.load_full()
    }

    /// Finds the first entry whose pattern accepts `path`, falling back to the
    /// not-found entry.
    /// ```rust
    /// use pattern_mux::{Router, NotFoundHandler};
    ///
    /// let router = Router::default()
    ///     .pattern("/user/:id", NotFoundHandler::default);
    ///
    /// let found = router.lookup("/user/42");
    /// assert!(found.matched);
    /// assert_eq!(found.params.get(":id"), Some("42"));
    ///
    /// assert!(!router.lookup("/post/42").matched);
    /// ```
    pub fn lookup(&self, path: impl AsRef<str>) -> Lookup {
        let path = path.as_ref();

        for entry in self.table.load().iter() {
            if let Some(params) = try_match(&entry.pattern, path) {
                return Lookup {
                    entry: entry.clone(),
                    params,
                    matched: true,
                };
            }
        }

        Lookup {
            entry: self.not_found.load_full(),
            params: Params::new(),
            matched: false,
        }
    }

    /// Routes `req` and runs it through its handler without writing or
    /// logging anything. Useful for testing.
    pub async fn resolve(&self, req: hyper::Request<Body>) -> Response {
        self.resolve_request(Request::new(req, Params::new())).await
    }

    /// Like [`resolve`](Router::resolve), for a request already wrapped, so
    /// that out-of-band details like a fragment or remote address survive.
    /// Any variables already on `req` are replaced by those of the match.
    pub async fn resolve_request(&self, mut req: Request) -> Response {
        let Lookup { entry, params, .. } = self.lookup(req.path());
        req.set_params(params);
        pipeline::process(&entry, req, &self.middleware).await
    }

    /// An asynchronous function from a `Request` to a `Response`. You will
    /// generally not need to use this function directly, and instead use
    /// [`Router::into_service`](crate::Router::into_service). It writes the
    /// response and logs one line per request.
    pub async fn serve(
        &self,
        req: hyper::Request<Body>,
        remote_addr: Option<SocketAddr>,
    ) -> hyper::Response<Body> {
        let start = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = self
            .resolve_request(Request::new(req, Params::new()).with_remote_addr(remote_addr))
            .await;
        let status = response.status;
        let written = write_response(response);

        tracing::info!(
            status = status.as_u16(),
            method = %method,
            uri = %uri,
            remote_addr = ?remote_addr,
            elapsed = ?start.elapsed(),
            "request served"
        );

        written
    }

    /// Converts the `Router` into a `Service` which you can serve directly with `Hyper`.
    /// ```rust,no_run
    /// # use pattern_mux::Router;
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let router = Router::default();
    ///
    /// hyper::Server::bind(&([127, 0, 0, 1], 3030).into())
    ///     .serve(router.into_service())
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_service(self) -> MakeRouterService {
        MakeRouterService(Arc::new(self))
    }
}

/// The default configuration: no `append_slash`, the stock not-found handler.
impl Default for Router {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[doc(hidden)]
#[derive(Clone)]
pub struct MakeRouterService(Arc<Router>);

impl MakeRouterService {
    pub fn router(&self) -> &Arc<Router> {
        &self.0
    }
}

impl<'a> Service<&'a AddrStream> for MakeRouterService {
    type Response = RouterService;
    type Error = Infallible;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, conn: &'a AddrStream) -> Self::Future {
        future::ok(RouterService {
            router: self.0.clone(),
            remote_addr: Some(conn.remote_addr()),
        })
    }
}

#[doc(hidden)]
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
    remote_addr: Option<SocketAddr>,
}

impl RouterService {
    pub fn new(router: Arc<Router>, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            router,
            remote_addr,
        }
    }
}

impl Service<hyper::Request<Body>> for RouterService {
    type Response = hyper::Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: hyper::Request<Body>) -> Self::Future {
        let router = self.router.clone();
        let remote_addr = self.remote_addr;
        Box::pin(async move { Ok(router.serve(req, remote_addr).await) })
    }
}

/// Serves `router` on its configured `serve_address` until the server fails.
pub async fn listen_and_serve(router: Router) -> Result<()> {
    let addr = router.settings().socket_addr()?;
    let server = hyper::Server::try_bind(&addr)?;

    tracing::info!(address = %addr, "listening");
    server.serve(router.into_service()).await?;
    Ok(())
}
