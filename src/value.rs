//! Values produced by item accessors.
//!
//! An accessor answers with a scalar, a date, a map (media descriptors) or a
//! sequence of any of those. Formatters normalise scalar-or-sequence before
//! emitting one element per value.
use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{FeedError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Date(DateTime<Utc>),
    Map(BTreeMap<String, Value>),
    List(Vec<Value>),
}

impl Value {
    /// Text form of a scalar. Maps and lists have none.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Integer(n) => Some(Cow::Owned(n.to_string())),
            Value::Date(d) => Some(Cow::Owned(d.to_rfc3339())),
            Value::Map(_) | Value::List(_) => None,
        }
    }

    /// Flattens one level: a list yields its members, anything else yields
    /// itself.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Value::List(values) => values,
            other => vec![other],
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Media> for Value {
    fn from(media: Media) -> Self {
        let mut map = BTreeMap::new();
        map.insert("type".to_string(), Value::Text(media.media_type));
        map.insert("length".to_string(), Value::Integer(media.length));
        map.insert("value".to_string(), Value::Text(media.url));
        Value::Map(map)
    }
}

/// A media resource attached to an item (RSS enclosure, Atom
/// `link rel="enclosure"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub media_type: String,
    pub length: i64,
    pub url: String,
}

impl Media {
    pub fn new(media_type: impl Into<String>, length: i64, url: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            length,
            url: url.into(),
        }
    }
}

/// A media descriptor after validation, borrowed from the accessor's value.
#[derive(Debug, PartialEq)]
pub(crate) struct MediaRef<'a> {
    pub media_type: Cow<'a, str>,
    pub length: Cow<'a, str>,
    pub url: Cow<'a, str>,
}

impl<'a> MediaRef<'a> {
    /// Requires `type`, `length` and `value` keys, each a scalar.
    pub(crate) fn from_value(value: &'a Value) -> Result<Self> {
        let key = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_text)
                .ok_or(FeedError::InvalidMedia)
        };

        Ok(Self {
            media_type: key("type")?,
            length: key("length")?,
            url: key("value")?,
        })
    }
}
