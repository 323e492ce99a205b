//! The request value handed to handlers and middleware.
use crate::params::Params;

use std::net::SocketAddr;

use hyper::{Body, HeaderMap, Method, Uri};
use url::form_urlencoded;

/// An inbound request together with the variables its route extracted.
#[derive(Debug)]
pub struct Request {
    inner: hyper::Request<Body>,
    params: Params,
    query: Vec<(String, String)>,
    fragment: Option<String>,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    pub fn new(inner: hyper::Request<Body>, params: Params) -> Self {
        let query = inner
            .uri()
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            inner,
            params,
            query,
            fragment: None,
            remote_addr: None,
        }
    }

    pub fn with_remote_addr(mut self, addr: Option<SocketAddr>) -> Self {
        self.remote_addr = addr;
        self
    }

    /// Attaches a URL fragment. Clients do not send fragments over the wire,
    /// so this is only set when a request is built out of band.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// The query string, without the leading `?`. Empty if there is none.
    pub fn raw_query(&self) -> &str {
        self.inner.uri().query().unwrap_or("")
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns the first query value for `key`, decoded.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every decoded query pair, in order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Shorthand for the first value of the path variable `:name`.
    /// ```rust
    /// use pattern_mux::{Params, Request};
    ///
    /// let mut params = Params::new();
    /// params.add(":id", "42");
    ///
    /// let raw = hyper::Request::get("/user/42").body(hyper::Body::empty()).unwrap();
    /// let req = Request::new(raw, params);
    /// assert_eq!(req.param("id"), Some("42"));
    /// ```
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(format!(":{}", name))
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Takes the request body, leaving an empty one behind.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(self.inner.body_mut())
    }

    pub fn inner(&self) -> &hyper::Request<Body> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut hyper::Request<Body> {
        &mut self.inner
    }
}
