//! Render RSS 2.0 and Atom feeds from arbitrary entities, and hydrate
//! entities from feed documents.
//!
//! ```ignore
//! use feedkit::{Config, FeedManager};
//!
//! let config = Config::load(Path::new("feedkit.toml"))?;
//! let mut manager = FeedManager::from_config(&config, None);
//!
//! let feed = manager.get("article")?;
//! feed.add_from_array(articles);
//! let xml = feed.render("rss")?;
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod field;
pub mod formatter;
pub mod item;
pub mod routing;
pub mod store;
pub mod translation;
pub mod util;
pub mod value;
pub mod xml;

pub use config::{Config, ConfigError, FeedConfig, Link};
pub use error::{ErrorKind, FeedError, Result};
pub use feed::{Feed, FeedDumpService, FeedManager, Reader};
pub use field::{
    ChannelField, FieldOptions, GroupChannelField, GroupItemField, ItemField, MediaItemField,
};
pub use formatter::{AtomFormatter, Formatter, FormatterRegistry, RssFormatter};
pub use item::{FeedItem, ItemInterface, RoutedItemInterface};
pub use routing::{LinkGenerator, RouteTable};
pub use translation::{CatalogTranslator, IdentityTranslator, Translator};
pub use value::{Media, Value};
