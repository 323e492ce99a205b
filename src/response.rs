//! The response value handlers build, and the writer that puts it on the wire.
use hyper::header::{self, HeaderMap, HeaderName, HeaderValue};
use hyper::{Body, StatusCode};

/// The default content type of a fresh response.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A response under construction.
///
/// Handlers and middleware mutate it freely while the request is being
/// processed. Once the pipeline hands it to [`write_response`] it is consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content_type: String,
    pub body: String,
}

impl Response {
    /// An empty `200 OK` HTML response.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: String::new(),
        }
    }

    /// A `200 OK` HTML response with the given body.
    /// ```rust
    /// use pattern_mux::Response;
    /// use hyper::StatusCode;
    ///
    /// let res = Response::with_body("Hello!")
    ///     .with_status(StatusCode::CREATED)
    ///     .with_content_type("text/plain");
    ///
    /// assert_eq!(res.status, StatusCode::CREATED);
    /// assert_eq!(res.body, "Hello!");
    /// ```
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::new()
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Appends a header value, keeping any values already set under `name`.
    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// A plain-text response whose body is the canonical reason for `status`.
    pub fn short(status: StatusCode) -> Self {
        Self::with_body(status.canonical_reason().unwrap_or_default())
            .with_status(status)
            .with_content_type("text/plain")
    }

    pub fn not_modified() -> Self {
        Self::short(StatusCode::NOT_MODIFIED)
    }

    pub fn bad_request() -> Self {
        Self::short(StatusCode::BAD_REQUEST)
    }

    pub fn forbidden() -> Self {
        Self::short(StatusCode::FORBIDDEN)
    }

    pub fn not_found() -> Self {
        Self::short(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Self {
        Self::short(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn gone() -> Self {
        Self::short(StatusCode::GONE)
    }

    pub fn server_error() -> Self {
        Self::short(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `response` onto a transport-level hyper response.
///
/// Every header is copied, multi-valued headers joined with a comma. The
/// content type then overrides any `Content-Type` header the handler set.
pub fn write_response(response: Response) -> hyper::Response<Body> {
    let Response {
        status,
        headers,
        content_type,
        body,
    } = response;

    let mut out = hyper::Response::new(Body::from(body));
    *out.status_mut() = status;

    let out_headers = out.headers_mut();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(HeaderValue::as_bytes)
            .collect::<Vec<_>>()
            .join(&b","[..]);

        match HeaderValue::from_bytes(&joined) {
            Ok(value) => {
                out_headers.insert(name.clone(), value);
            }
            Err(_) => tracing::warn!(header = %name, "dropping unencodable header"),
        }
    }

    match HeaderValue::from_str(&content_type) {
        Ok(value) => {
            out_headers.insert(header::CONTENT_TYPE, value);
        }
        Err(_) => tracing::warn!(content_type = %content_type, "dropping invalid content type"),
    }

    out
}
