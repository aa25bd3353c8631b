//! Metadata values with syntactic typing.
//!
//! Literal metadata carries its text as found in the source plus an optional
//! typed value. The type is derived from the syntax of the text unless the
//! format supplies an explicit XSD-style type hint (`xsd:integer`, ...).
//!
//! [`Extensions`] is the ordered key/value side-channel every event carries.

use memchr::memchr3;

/// A typed metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// `null` or `nil`
    Nil,

    /// `true` or `false` (lowercase only)
    Bool(bool),

    /// `42`, `-7`, `0xFF`, `1_000`
    Integer(i64),

    /// `3.14`, `1.5e-3`, `NaN`, `inf`
    Float(f64),

    String(String),

    List(Vec<MetaValue>),
}

impl MetaValue {
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, MetaValue::Nil)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetaValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers are widened to floats.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            MetaValue::Float(f) => Some(*f),
            MetaValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse `text` into a typed value.
    ///
    /// - `null`/`nil` → Nil
    /// - `true`/`false` → Bool
    /// - Integer patterns (42, 0xFF, 1_000) → Integer
    /// - Float patterns (3.14, 1.5e-3, NaN, inf) → Float
    /// - Everything else → String
    pub fn parse(text: &str) -> MetaValue {
        match text {
            "" => return MetaValue::String(String::new()),
            "null" | "nil" => return MetaValue::Nil,
            "true" => return MetaValue::Bool(true),
            "false" => return MetaValue::Bool(false),
            _ => {}
        }
        Self::try_parse_number(text).unwrap_or_else(|| MetaValue::String(text.to_owned()))
    }

    /// Parse `text` according to an XSD type name such as `xsd:double`.
    ///
    /// Unknown type names fall back to [`MetaValue::parse`]. Returns `None`
    /// if the text does not conform to a known type.
    pub fn parse_typed(text: &str, original_type: &str) -> Option<MetaValue> {
        let local = original_type
            .rsplit_once(':')
            .map_or(original_type, |(_, local)| local);
        match local {
            "string" | "normalizedString" | "token" | "anyURI" | "NCName" | "ID" | "IDREF" => {
                Some(MetaValue::String(text.to_owned()))
            }
            "boolean" => match text.trim() {
                "true" | "1" => Some(MetaValue::Bool(true)),
                "false" | "0" => Some(MetaValue::Bool(false)),
                _ => None,
            },
            "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "negativeInteger" | "nonPositiveInteger" => {
                match Self::try_parse_number(text.trim())? {
                    value @ MetaValue::Integer(_) => Some(value),
                    _ => None,
                }
            }
            "double" | "float" | "decimal" => {
                Self::try_parse_number(text.trim())?.as_float().map(MetaValue::Float)
            }
            _ => Some(Self::parse(text)),
        }
    }

    fn try_parse_number(text: &str) -> Option<MetaValue> {
        let bytes = text.as_bytes();
        let (negative, rest) = match bytes.first() {
            Some(b'-') => (true, &bytes[1..]),
            Some(b'+') => (false, &bytes[1..]),
            _ => (false, bytes),
        };
        if rest.is_empty() {
            return None;
        }

        if rest.len() > 2 && rest[0] == b'0' && matches!(rest[1], b'x' | b'X') {
            return Self::try_parse_radix(negative, &rest[2..], 16);
        }

        if matches!(rest, b"NaN" | b"nan") {
            return Some(MetaValue::Float(f64::NAN));
        }
        if matches!(rest, b"inf" | b"INF" | b"Infinity") {
            let value = if negative { f64::NEG_INFINITY } else { f64::INFINITY };
            return Some(MetaValue::Float(value));
        }

        if memchr3(b'.', b'e', b'E', rest).is_some() {
            return Self::try_parse_float(text);
        }

        Self::try_parse_radix(negative, rest, 10)
    }

    fn try_parse_radix(negative: bool, bytes: &[u8], radix: u32) -> Option<MetaValue> {
        if bytes.is_empty() || bytes[0] == b'_' {
            return None;
        }
        let mut result: i64 = 0;
        for &b in bytes {
            if b == b'_' {
                continue;
            }
            let digit = (b as char).to_digit(radix)?;
            result = result.checked_mul(radix as i64)?.checked_add(digit as i64)?;
        }
        if negative {
            result = result.checked_neg()?;
        }
        Some(MetaValue::Integer(result))
    }

    fn try_parse_float(text: &str) -> Option<MetaValue> {
        // Reject forms Rust accepts but metadata syntax does not (e.g. "1.")
        let last = *text.as_bytes().last()?;
        if !last.is_ascii_digit() {
            return None;
        }
        text.parse::<f64>().ok().map(MetaValue::Float)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Integer(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::String(value.to_owned())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::String(value)
    }
}

// ============================================================================
// Extensions
// ============================================================================

/// Ordered key/value annotations attached to an event when it is built.
///
/// Keys are unique; inserting an existing key replaces the value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extensions {
    entries: Vec<(String, MetaValue)>,
}

impl Extensions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> FromIterator<(K, V)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut extensions = Extensions::new();
        for (key, value) in iter {
            extensions.insert(key, value);
        }
        extensions
    }
}
