//! Feed container, registry, reader and dump service.
//!
//! - [`Feed`] - configuration, items and custom fields of one named feed,
//!   rendered through a [`FormatterRegistry`]
//! - [`FeedManager`] - builds feeds from configuration by name
//! - [`Reader`] - parses feed documents and hydrates entities from them
//! - [`FeedDumpService`] - renders a feed from repository entities into a file
//!
//! # Example
//!
//! ```ignore
//! let mut manager = FeedManager::from_config(&config, Some(router));
//! let feed = manager.get("article")?;
//! feed.add(article);
//! let xml = feed.render("rss")?;
//! ```

mod dump;
mod hydrator;
mod manager;
mod reader;

pub use dump::{
    Criteria, Direction, EntityManager, FeedDumpService, Filesystem, LocalFilesystem, OrderBy,
    Repository,
};
pub use hydrator::{DefaultHydrator, Hydrator};
pub use manager::FeedManager;
pub use reader::{ParsedEntry, ParsedFeed, Reader, RemoteSource};

use std::fmt;
use std::sync::Arc;

use crate::config::{FeedConfig, Link};
use crate::error::{FeedError, Result};
use crate::field::{ChannelFieldKind, ItemFieldKind};
use crate::formatter::FormatterRegistry;
use crate::item::{FeedItem, ItemInterface, PlainItem, ProxyItem, RoutedItemInterface};
use crate::routing::LinkGenerator;

/// One named feed: its configuration, the items to render and any custom
/// channel or item fields.
pub struct Feed {
    name: String,
    config: FeedConfig,
    items: Vec<Box<dyn FeedItem>>,
    channel_fields: Vec<ChannelFieldKind>,
    item_fields: Vec<ItemFieldKind>,
    formatters: Arc<FormatterRegistry>,
    router: Option<Arc<dyn LinkGenerator>>,
}

impl Feed {
    pub fn new(
        name: impl Into<String>,
        config: FeedConfig,
        formatters: Arc<FormatterRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            items: Vec::new(),
            channel_fields: Vec::new(),
            item_fields: Vec::new(),
            formatters,
            router: None,
        }
    }

    /// Binds the link generator used for route-based feed links and routed
    /// items.
    pub fn with_router(mut self, router: Arc<dyn LinkGenerator>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn description(&self) -> &str {
        &self.config.description
    }

    pub fn encoding(&self) -> &str {
        &self.config.encoding
    }

    pub fn author(&self) -> Option<&str> {
        self.config.author.as_deref()
    }

    /// The feed link, generated through the link generator when configured
    /// as a route.
    pub fn link(&self) -> Result<String> {
        match &self.config.link {
            Link::Uri(uri) => Ok(uri.clone()),
            Link::Route {
                route_name,
                route_params,
            } => {
                let router = self
                    .router
                    .as_ref()
                    .ok_or_else(|| FeedError::MissingLinkGenerator(route_name.clone()))?;
                router.generate(route_name, route_params, true)
            }
        }
    }

    /// Looks up a configuration parameter. `link` is resolved like
    /// [`Feed::link`].
    pub fn get(&self, parameter: &str) -> Result<Option<String>> {
        let value = match parameter {
            "title" => Some(self.config.title.clone()),
            "description" => Some(self.config.description.clone()),
            "encoding" => Some(self.config.encoding.clone()),
            "author" => self.config.author.clone(),
            "link" => Some(self.link()?),
            other => self.config.extra.get(other).cloned(),
        };
        Ok(value)
    }

    pub fn get_or(&self, parameter: &str, default: &str) -> Result<String> {
        Ok(self
            .get(parameter)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Sets a configuration parameter. A `link` set here is a literal URI.
    pub fn set(&mut self, parameter: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match parameter {
            "title" => self.config.title = value,
            "description" => self.config.description = value,
            "encoding" => self.config.encoding = value,
            "author" => self.config.author = Some(value),
            "link" => self.config.link = Link::Uri(value),
            other => {
                self.config.extra.insert(other.to_string(), value);
            }
        }
        self
    }

    /// Clears a configuration parameter. Required parameters become empty.
    pub fn unset(&mut self, parameter: &str) -> &mut Self {
        match parameter {
            "title" => self.config.title.clear(),
            "description" => self.config.description.clear(),
            "encoding" => self.config.encoding.clear(),
            "author" => self.config.author = None,
            "link" => self.config.link = Link::Uri(String::new()),
            other => {
                self.config.extra.remove(other);
            }
        }
        self
    }

    pub fn set_link(&mut self, link: Link) -> &mut Self {
        self.config.link = link;
        self
    }

    /// Appends an entity carrying its own link.
    pub fn add<T: ItemInterface>(&mut self, item: T) -> &mut Self {
        self.push(Box::new(PlainItem::new(item)))
    }

    /// Appends an entity whose link comes from a route.
    ///
    /// Fails with [`FeedError::MissingLinkGenerator`] when no link generator
    /// is bound to the feed.
    pub fn add_routed<T: RoutedItemInterface>(&mut self, item: T) -> Result<&mut Self> {
        let router = self
            .router
            .clone()
            .ok_or_else(|| FeedError::MissingLinkGenerator(item.feed_item_route_name()))?;
        Ok(self.push(Box::new(ProxyItem::new(item, router))))
    }

    pub fn add_from_array<T, I>(&mut self, items: I) -> &mut Self
    where
        T: ItemInterface,
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.add(item);
        }
        self
    }

    /// Appends an already adapted item.
    pub fn push(&mut self, item: Box<dyn FeedItem>) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn extend<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn FeedItem>>,
    {
        self.items.extend(items);
        self
    }

    /// Replaces the item list.
    pub fn set_items(&mut self, items: Vec<Box<dyn FeedItem>>) -> &mut Self {
        self.items = items;
        self
    }

    pub fn get_items(&self) -> &[Box<dyn FeedItem>] {
        &self.items
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn add_channel_field(&mut self, field: impl Into<ChannelFieldKind>) -> &mut Self {
        self.channel_fields.push(field.into());
        self
    }

    pub fn get_channel_fields(&self) -> &[ChannelFieldKind] {
        &self.channel_fields
    }

    pub fn add_item_field(&mut self, field: impl Into<ItemFieldKind>) -> &mut Self {
        self.item_fields.push(field.into());
        self
    }

    pub fn get_item_fields(&self) -> &[ItemFieldKind] {
        &self.item_fields
    }

    /// Renders the feed in `format`. The feed itself is not modified.
    pub fn render(&self, format: &str) -> Result<String> {
        let formatter = self.formatters.get_formatter(format)?;
        formatter.render(self).inspect_err(|e| {
            tracing::warn!(feed = %self.name, format = %format, error = %e, "Render failed");
        })
    }
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("items", &self.items.len())
            .field("channel_fields", &self.channel_fields)
            .field("item_fields", &self.item_fields)
            .field("formatters", &self.formatters)
            .finish_non_exhaustive()
    }
}
