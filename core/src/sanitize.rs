//! Key normalization applied to dimensions and properties before encoding.

use crate::Dimensions;
use std::borrow::Cow;

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_key(key: &str) -> Cow<'_, str> {
    if key.chars().all(is_allowed) {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(key.chars().map(|c| if is_allowed(c) { c } else { '_' }).collect())
    }
}

/// Drop entries with an empty key and sanitize the remaining keys. Values are
/// left untouched.
///
/// Keys that collide after sanitizing are resolved last-write-wins, in the
/// lexical order of the original keys.
pub fn sanitize_dimensions(dimensions: &Dimensions) -> Dimensions {
    dimensions
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (sanitize_key(key).into_owned(), value.clone()))
        .collect()
}
