//! Captured route parameters.
//!
//! The buffer is owned by the caller and handed to every query as scratch
//! space. Keys borrow the tree, values borrow the queried path (owned only
//! when percent-decoding changed the bytes), so one buffer serves any
//! number of lookups made for the same request.

use crate::path;
use std::borrow::Cow;

/// A single captured parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param<'tree, 'path> {
    key: &'tree str,
    value: Cow<'path, str>,
}

impl<'tree, 'path> Param<'tree, 'path> {
    pub fn key(&self) -> &'tree str {
        self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An ordered list of captured parameters, in the order the wildcards
/// occur along the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params<'tree, 'path> {
    entries: Vec<Param<'tree, 'path>>,
}

impl<'tree, 'path> Params<'tree, 'path> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Value of the first parameter registered under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|param| param.key == name)
            .map(|param| &*param.value)
    }

    /// Like [`get`](Self::get), with a miss reading as the empty string.
    pub fn by_name(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|param| (param.key, &*param.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop captures recorded past `len`, unwinding to a skipped branch.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Make room for at least `capacity` captures before appending.
    pub(crate) fn grow(&mut self, capacity: usize) {
        if self.entries.capacity() < capacity {
            self.entries.reserve(capacity - self.entries.len());
        }
    }

    /// Record a capture. The value keeps its raw bytes when `unescape` is
    /// off or the escape sequence is malformed.
    pub(crate) fn capture(&mut self, key: &'tree [u8], value: &'path [u8], unescape: bool) {
        let raw = path::as_str(value);
        let value = if unescape {
            path::unescape(raw).unwrap_or(Cow::Borrowed(raw))
        } else {
            Cow::Borrowed(raw)
        };
        self.entries.push(Param {
            key: path::as_str(key),
            value,
        });
    }
}

impl<'tree, 'path> std::ops::Index<usize> for Params<'tree, 'path> {
    type Output = Param<'tree, 'path>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}
