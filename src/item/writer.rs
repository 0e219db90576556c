use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{FeedError, Result};
use crate::routing::RouteParams;
use crate::value::Value;

/// Accessor names answered by every renderable item.
pub mod accessor {
    pub const TITLE: &str = "feed_item_title";
    pub const DESCRIPTION: &str = "feed_item_description";
    pub const LINK: &str = "feed_item_link";
    pub const PUB_DATE: &str = "feed_item_pub_date";
}

/// Extracts one value from an entity. `None` means "no value": the field
/// renders nothing for this item.
pub type Accessor<T> = fn(&T) -> Option<Value>;

/// Named accessors an entity type exposes to custom fields and attribute
/// resolution.
pub struct AccessorRegistry<T> {
    accessors: HashMap<String, Accessor<T>>,
}

impl<T> AccessorRegistry<T> {
    pub fn new() -> Self {
        Self {
            accessors: HashMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, accessor: Accessor<T>) -> Self {
        self.register(name, accessor);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, accessor: Accessor<T>) {
        self.accessors.insert(name.into(), accessor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    pub fn call(&self, item: &T, name: &str) -> Result<Option<Value>> {
        let accessor = self
            .accessors
            .get(name)
            .ok_or_else(|| FeedError::AccessorNotFound(name.to_string()))?;
        Ok(accessor(item))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }
}

impl<T> Default for AccessorRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AccessorRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            accessors: self.accessors.clone(),
        }
    }
}

impl<T> fmt::Debug for AccessorRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("AccessorRegistry")
            .field("accessors", &names)
            .finish()
    }
}

/// An entity that can be written to a feed with a precomputed link.
pub trait ItemInterface: 'static {
    fn feed_item_title(&self) -> String;

    /// Description or content.
    fn feed_item_description(&self) -> String;

    fn feed_item_link(&self) -> String;

    fn feed_item_pub_date(&self) -> DateTime<Utc>;

    /// Accessors beyond the four built-ins, referenced by custom fields.
    fn accessors() -> AccessorRegistry<Self>
    where
        Self: Sized,
    {
        AccessorRegistry::new()
    }
}

/// An entity whose link is generated from a route at render time.
pub trait RoutedItemInterface: 'static {
    fn feed_item_title(&self) -> String;

    fn feed_item_description(&self) -> String;

    fn feed_item_route_name(&self) -> String;

    fn feed_item_route_parameters(&self) -> RouteParams {
        RouteParams::new()
    }

    /// Anchor appended to the generated URL, without the `#`.
    fn feed_item_url_anchor(&self) -> Option<String> {
        None
    }

    fn feed_item_pub_date(&self) -> DateTime<Utc>;

    fn accessors() -> AccessorRegistry<Self>
    where
        Self: Sized,
    {
        AccessorRegistry::new()
    }
}

/// What a formatter needs from an item: named accessor calls.
///
/// [`PlainItem`] and [`ProxyItem`](super::ProxyItem) implement it for typed
/// entities; records with a dynamic shape can implement it directly.
pub trait FeedItem {
    /// Calls `accessor`, failing with [`FeedError::AccessorNotFound`] when the
    /// item has no such accessor.
    fn call(&self, accessor: &str) -> Result<Option<Value>>;

    fn responds_to(&self, accessor: &str) -> bool;
}

/// Adapts an [`ItemInterface`] entity to [`FeedItem`].
pub struct PlainItem<T> {
    item: T,
    accessors: AccessorRegistry<T>,
}

impl<T: ItemInterface> PlainItem<T> {
    pub fn new(item: T) -> Self {
        let mut accessors = T::accessors();
        accessors.register(accessor::TITLE, |i: &T| Some(i.feed_item_title().into()));
        accessors.register(accessor::DESCRIPTION, |i: &T| {
            Some(i.feed_item_description().into())
        });
        accessors.register(accessor::LINK, |i: &T| Some(i.feed_item_link().into()));
        accessors.register(accessor::PUB_DATE, |i: &T| {
            Some(i.feed_item_pub_date().into())
        });

        Self { item, accessors }
    }
}

impl<T: ItemInterface> FeedItem for PlainItem<T> {
    fn call(&self, accessor: &str) -> Result<Option<Value>> {
        self.accessors.call(&self.item, accessor)
    }

    fn responds_to(&self, accessor: &str) -> bool {
        self.accessors.contains(accessor)
    }
}

impl<T: fmt::Debug> fmt::Debug for PlainItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainItem")
            .field("item", &self.item)
            .field("accessors", &self.accessors)
            .finish()
    }
}
