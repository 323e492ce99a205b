//! Pattern matching against request paths.
//!
//! A pattern mixes literal bytes with `:name` variables. A name is a run of
//! ASCII letters, digits and underscores. The value of a variable runs until
//! the byte that follows the name in the *pattern*, or until the next `/`:
//! ```ignore
//!  Pattern: /a:x/b
//!
//!   /a123/b        match: :x="123"
//!   /a/b           match: :x=""
//!   /a12/c         no match
//! ```
//!
//! A pattern that ends with `/` (other than the bare `/` pattern) also
//! accepts any path it is a prefix of:
//! ```ignore
//!  Pattern: /static/
//!
//!   /static/             match
//!   /static/a/b/c        match
//!   /static              no match
//! ```
//!
//! Values are the literal bytes of the path. Nothing is URL-decoded.
use crate::params::Params;

/// Advances through `s` from `i` while `f` holds for each byte.
///
/// Returns the consumed substring, the first byte that failed `f` (zero if
/// the end of `s` was reached) and the index of that byte.
pub fn match_while<F>(s: &str, f: F, i: usize) -> (&str, u8, usize)
where
    F: Fn(u8) -> bool,
{
    let bytes = s.as_bytes();
    let mut j = i;
    while j < bytes.len() && f(bytes[j]) {
        j += 1;
    }

    let next = if j < bytes.len() { bytes[j] } else { 0 };
    (&s[i..j], next, j)
}

/// Classifies the bytes of a variable name.
pub fn is_alnum(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Classifies the bytes of a variable value that ends at `terminator`.
pub fn is_part(terminator: u8) -> impl Fn(u8) -> bool {
    move |c| c != terminator && c != b'/'
}

/// Tries `pattern` against `path`, returning the extracted variables on a match.
/// ```rust
/// use pattern_mux::matcher::try_match;
///
/// let params = try_match("/user/:id", "/user/42").unwrap();
/// assert_eq!(params.get(":id"), Some("42"));
///
/// assert!(try_match("/user/:id", "/user/42/posts").is_none());
/// ```
pub fn try_match(pattern: &str, path: &str) -> Option<Params> {
    let pat = pattern.as_bytes();
    let s = path.as_bytes();

    let mut params = Params::new();
    let (mut i, mut j) = (0, 0);

    while i < s.len() {
        if j >= pat.len() {
            if pattern != "/" && pattern.ends_with('/') {
                return Some(params);
            }
            return None;
        }

        if pat[j] == b':' {
            let (name, next, end) = match_while(pattern, is_alnum, j + 1);
            j = end;

            let (value, _, end) = match_while(path, is_part(next), i);
            i = end;

            params.add(format!(":{}", name), value);
        } else if s[i] == pat[j] {
            i += 1;
            j += 1;
        } else {
            return None;
        }
    }

    if j != pat.len() {
        return None;
    }

    Some(params)
}
