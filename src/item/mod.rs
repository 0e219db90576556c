//! Capabilities an entity implements to be written to, or read from, a feed.
//!
//! - [`writer::ItemInterface`] - entity with a precomputed link
//! - [`writer::RoutedItemInterface`] - entity whose link comes from a route,
//!   adapted by [`ProxyItem`]
//! - [`reader::ItemInterface`] - hydration target for parsed entries
//!
//! Formatters only see [`FeedItem`]: an object-safe view resolving accessors
//! by name through a per-type [`AccessorRegistry`].

pub mod reader;
pub mod writer;

mod proxy;

pub use proxy::ProxyItem;
pub use writer::{
    accessor, Accessor, AccessorRegistry, FeedItem, ItemInterface, PlainItem,
    RoutedItemInterface,
};
