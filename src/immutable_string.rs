//! The `ImmutableString` type.

use crate::{Shared, SmartString};
use std::{borrow::Borrow, fmt, ops::Deref};

/// The string payload behind every string value, identifier and table key.
///
/// Teeny passes strings around constantly — interpolation fragments, error
/// payloads, environment names, table keys — and never mutates one in place
/// (even the string index-assignment form rebuilds the text and rebinds the
/// variable). So the text lives behind a shared pointer: cloning is a
/// reference-count bump, and short strings stay inline thanks to
/// [`SmartString`].
///
/// # Example
///
/// ```
/// use teeny::ImmutableString;
///
/// let key: ImmutableString = "name".into();
/// let alias = key.clone(); // shares the same text
///
/// assert_eq!(key, alias);
/// assert_eq!(key.as_str(), "name");
/// ```
///
/// # Hashing
///
/// The derived `Hash` hashes the text itself (a [`SmartString`] hashes like
/// `str`), which is what makes the `Borrow<str>` lookups on environment
/// frames and table keys sound.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImmutableString(Shared<SmartString>);

impl ImmutableString {
    /// The text as a plain string slice.
    #[inline(always)]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Join two strings, reusing either side whenever the other is empty —
    /// interpolation produces a lot of empty fragments.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if self.is_empty() {
            other.clone()
        } else if other.is_empty() {
            self.clone()
        } else {
            let mut joined = SmartString::from(self.as_str());
            joined.push_str(other.as_str());
            Self(Shared::new(joined))
        }
    }
}

impl Deref for ImmutableString {
    type Target = str;

    #[inline(always)]
    fn deref(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ImmutableString {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for ImmutableString {
    #[inline(always)]
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ImmutableString {
    #[inline(always)]
    fn from(text: &str) -> Self {
        Self(Shared::new(text.into()))
    }
}

impl From<String> for ImmutableString {
    #[inline(always)]
    fn from(text: String) -> Self {
        Self(Shared::new(text.into()))
    }
}

impl From<char> for ImmutableString {
    #[inline(always)]
    fn from(c: char) -> Self {
        let mut text = SmartString::new();
        text.push(c);
        Self(Shared::new(text))
    }
}

impl FromIterator<char> for ImmutableString {
    #[inline(always)]
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self(Shared::new(iter.into_iter().collect()))
    }
}

impl fmt::Display for ImmutableString {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ImmutableString {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_text() {
        let a: ImmutableString = "interpolate".into();
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(Shared::strong_count(&a.0), 2);
    }

    #[test]
    fn test_concat_reuses_empty_sides() {
        let empty: ImmutableString = "".into();
        let text: ImmutableString = "ab".into();

        assert_eq!(empty.concat(&text).as_str(), "ab");
        assert_eq!(text.concat(&empty).as_str(), "ab");
        assert_eq!(text.concat(&text).as_str(), "abab");
    }
}
