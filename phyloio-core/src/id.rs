//! Document-scoped identifiers.
//!
//! IDs follow the XML `NCName` production: a letter or underscore, followed by
//! letters, digits, `_`, `-`, `.` or combining characters. No colons.
//! Unicode letter classes are taken from `unicode-xid`.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use unicode_xid::UnicodeXID;

use crate::error::{EventError, IdError};

#[inline]
fn is_name_start(ch: char) -> bool {
    ch == '_' || UnicodeXID::is_xid_start(ch)
}

#[inline]
fn is_name_char(ch: char) -> bool {
    matches!(ch, '-' | '.' | '\u{B7}') || UnicodeXID::is_xid_continue(ch)
}

/// Check `value` against the NCName production.
pub fn check_nc_name(value: &str) -> Result<(), IdError> {
    let mut chars = value.char_indices();
    let Some((_, first)) = chars.next() else {
        return Err(IdError::Empty);
    };
    if value.trim().is_empty() {
        return Err(IdError::Whitespace);
    }
    if !is_name_start(first) {
        return Err(IdError::InvalidStart { ch: first });
    }
    for (index, ch) in chars {
        if !is_name_char(ch) {
            return Err(IdError::InvalidChar { ch, index });
        }
    }
    Ok(())
}

#[inline]
pub fn is_nc_name(value: &str) -> bool {
    check_nc_name(value).is_ok()
}

/// A validated, document-unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(String);

impl Id {
    /// Validate and wrap `value`.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        check_nc_name(&value)?;
        Ok(Self(value))
    }

    /// Only for strings known to be valid, e.g. a valid ID plus a numeric suffix.
    pub(crate) fn from_validated(value: String) -> Self {
        debug_assert!(is_nc_name(&value), "invalid generated ID {value:?}");
        Self(value)
    }

    /// Like [`Id::new`], but reports the failing field of the event being built.
    pub(crate) fn for_field(field: &'static str, value: impl Into<String>) -> Result<Self, EventError> {
        let value = value.into();
        match check_nc_name(&value) {
            Ok(()) => Ok(Self(value)),
            Err(source) => Err(EventError::InvalidId { field, value, source }),
        }
    }

    /// Optional variant of [`Id::for_field`].
    pub(crate) fn for_optional_field(
        field: &'static str,
        value: Option<impl Into<String>>,
    ) -> Result<Option<Self>, EventError> {
        value.map(|value| Self::for_field(field, value)).transpose()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Id {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<&str> for Id {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, IdError> {
        Id::new(value)
    }
}

impl TryFrom<String> for Id {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, IdError> {
        Id::new(value)
    }
}
