//! Variables extracted from a request path.

use std::fmt;

/// A single extracted variable, as a key/value pair.
///
/// Keys carry the leading `:` of the pattern segment that produced them,
/// so the pattern `/user/:id` yields the key `:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// An ordered, multi-valued map of extracted variables.
///
/// A pattern may repeat a variable name. Every occurrence is kept, in the
/// order the matcher consumed it, rather than the last one overwriting
/// the others.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Param {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Returns the first value stored under `key`.
    /// ```rust
    /// use pattern_mux::Params;
    ///
    /// let mut params = Params::new();
    /// params.add(":id", "42");
    /// assert_eq!(params.get(":id"), Some("42"));
    /// assert_eq!(params.get("id"), None);
    /// ```
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.0
            .iter()
            .find(|param| param.key == key)
            .map(|param| param.value.as_str())
    }

    /// Returns every value stored under `key`, in match order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |param| param.key == key)
            .map(|param| param.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Params {
    type Output = Param;

    fn index(&self, i: usize) -> &Param {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|param| (&param.key, &param.value)))
            .finish()
    }
}
