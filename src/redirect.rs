//! Redirect responses.
use crate::path::clean;
use crate::request::Request;
use crate::response::Response;

use std::borrow::Cow;

use hyper::header::{self, HeaderValue};
use hyper::{Method, StatusCode};
use url::{ParseError, Url};

/// A `301 Moved Permanently` redirect to `target`.
pub fn permanent(req: &Request, target: &str) -> Response {
    redirect(req, target, StatusCode::MOVED_PERMANENTLY)
}

/// A `307 Temporary Redirect` to `target`.
pub fn temporary(req: &Request, target: &str) -> Response {
    redirect(req, target, StatusCode::TEMPORARY_REDIRECT)
}

/// Builds a redirect to `target` with the given status.
///
/// A target without a scheme is resolved against the directory of the
/// request path and cleaned. A target that cannot be parsed at all is used
/// as given.
///
/// When neither the resolved location nor the raw target is a valid header
/// value the response goes out without a `Location` header and a warning is
/// logged.
pub fn redirect(req: &Request, target: &str, status: StatusCode) -> Response {
    let location = resolve_target(req.path(), target);

    let mut response = Response::new().with_status(status);
    let value = HeaderValue::from_bytes(location.as_bytes())
        .or_else(|_| HeaderValue::from_bytes(target.as_bytes()));
    match value {
        Ok(value) => response.add_header(header::LOCATION, value),
        Err(_) => tracing::warn!(
            location = %location.escape_debug(),
            "redirect target is not a valid header value"
        ),
    }

    // Older user agents may not understand 301/307, so GET responses carry a
    // short note. POST and HEAD responses must not rely on a body.
    if req.method() == Method::GET {
        response.body = format!(
            "<a href=\"{}\">{}</a>.\n",
            html_escape(&location),
            status.canonical_reason().unwrap_or_default()
        );
    }

    response
}

fn resolve_target(current: &str, target: &str) -> String {
    match Url::parse(target) {
        Err(ParseError::RelativeUrlWithoutBase) if !is_malformed_reference(target) => {}
        // absolute, or malformed
        _ => return target.to_string(),
    }

    let current = if current.is_empty() { "/" } else { current };

    let mut target = if target.starts_with('/') {
        target.to_string()
    } else {
        let dir = match current.rfind('/') {
            Some(i) => &current[..=i],
            None => "",
        };
        format!("{}{}", dir, target)
    };

    let query = match target.find('?') {
        Some(i) => target.split_off(i),
        None => String::new(),
    };

    let trailing = target.ends_with('/');
    let mut cleaned = clean(&target);
    if trailing && !cleaned.ends_with('/') {
        cleaned.push('/');
    }

    cleaned.push_str(&query);
    cleaned
}

/// Relative references the `url` crate lets through but a strict URI parser
/// refuses: control characters, bad percent escapes in the path or fragment,
/// and a colon in the first path segment.
fn is_malformed_reference(target: &str) -> bool {
    if target.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return true;
    }

    let (rest, fragment) = match target.find('#') {
        Some(i) => (&target[..i], &target[i + 1..]),
        None => (target, ""),
    };
    let path = match rest.find('?') {
        Some(i) => &rest[..i],
        None => rest,
    };

    let first_segment = path.split('/').next().unwrap_or_default();
    first_segment.contains(':') || has_bad_escape(path) || has_bad_escape(fragment)
}

fn has_bad_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return true,
            }
        } else {
            i += 1;
        }
    }
    false
}

fn html_escape(s: &str) -> Cow<'_, str> {
    if s.contains(&['&', '<', '>', '"', '\''][..]) {
        let mut escaped = String::with_capacity(s.len() + 8);
        for c in s.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&#34;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(s)
    }
}
