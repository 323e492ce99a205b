//! Lexical path cleaning.

/// Returns the canonical, rooted form of `p`, eliminating `.` and `..`
/// elements and repeated slashes.
///
/// The following rules are applied until no further processing can be done:
///  1. Replace multiple slashes with a single slash.
///  2. Eliminate each `.` path name element (the current directory).
///  3. Eliminate each inner `..` path name element (the parent directory)
///     along with the non-`..` element that precedes it.
///  4. Eliminate `..` elements that begin a rooted path:
///     that is, replace `/..` by `/` at the beginning of a path.
///
/// A path that is not rooted is made rooted. A trailing slash is kept, but a
/// trailing `.` element is dropped along with its slash, so `/abc/.` cleans
/// to `/abc`. An empty path cleans to `/`.
pub fn clean(p: &str) -> String {
    if p.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::with_capacity(p.len() / 2 + 1);
    for segment in p.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    let trailing = p.len() > 1 && p.ends_with('/');

    let mut cleaned = String::with_capacity(p.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }

    if cleaned.is_empty() || trailing {
        cleaned.push('/');
    }

    cleaned
}
