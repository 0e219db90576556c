use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{FeedError, Result};
use crate::item::reader::ItemInterface;
use crate::util::validate_remote_source;

use super::hydrator::{DefaultHydrator, Hydrator};

/// Fetches the raw bytes of a remote feed document.
pub trait RemoteSource: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// A parsed feed document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    pub entries: Vec<ParsedEntry>,
}

/// One entry of a parsed feed, in a format-independent shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub id: String,
    pub title: String,
    /// Content body, or the summary when the entry has no content.
    pub content: String,
    pub link: Option<String>,
    /// Last modification, or publication when the entry has no update date.
    pub updated: Option<DateTime<Utc>>,
    pub authors: Vec<String>,
}

impl From<feed_rs::model::Feed> for ParsedFeed {
    fn from(feed: feed_rs::model::Feed) -> Self {
        let entries = feed
            .entries
            .into_iter()
            .map(|entry| {
                let content = entry
                    .content
                    .and_then(|c| c.body)
                    .or_else(|| entry.summary.map(|s| s.content))
                    .unwrap_or_default();

                ParsedEntry {
                    id: entry.id,
                    title: entry.title.map(|t| t.content).unwrap_or_default(),
                    content,
                    link: entry.links.into_iter().next().map(|l| l.href),
                    updated: entry.updated.or(entry.published),
                    authors: entry.authors.into_iter().map(|p| p.name).collect(),
                }
            })
            .collect();

        ParsedFeed {
            title: feed.title.map(|t| t.content),
            description: feed.description.map(|d| d.content),
            link: feed.links.into_iter().next().map(|l| l.href),
            updated: feed.updated,
            entries,
        }
    }
}

/// Loads a feed document and hydrates entities from its entries.
pub struct Reader {
    feed: Option<ParsedFeed>,
    hydrator: Box<dyn Hydrator>,
    remote: Option<Arc<dyn RemoteSource>>,
}

impl Reader {
    pub fn new() -> Self {
        Self {
            feed: None,
            hydrator: Box::new(DefaultHydrator),
            remote: None,
        }
    }

    pub fn set_hydrator(&mut self, hydrator: impl Hydrator + 'static) -> &mut Self {
        self.hydrator = Box::new(hydrator);
        self
    }

    /// Source used for `load` arguments that are not existing files.
    pub fn set_remote_source(&mut self, remote: Arc<dyn RemoteSource>) -> &mut Self {
        self.remote = Some(remote);
        self
    }

    /// Loads `source`: an existing file path is read from disk, anything
    /// else must be a public http(s) URL and is fetched through the remote
    /// source.
    pub fn load(&mut self, source: &str) -> Result<&mut Self> {
        let path = Path::new(source);
        let bytes = if path.exists() {
            tracing::debug!(path = %path.display(), "Loading feed from file");
            std::fs::read(path)?
        } else {
            let url = validate_remote_source(source).map_err(|e| FeedError::InvalidSource {
                source_str: source.to_string(),
                reason: e.to_string(),
            })?;
            let remote = self
                .remote
                .as_ref()
                .ok_or_else(|| FeedError::NoRemoteSource(source.to_string()))?;

            tracing::debug!(url = %url, "Loading remote feed");
            remote.fetch(&url)?
        };

        self.load_bytes(&bytes)
    }

    /// Parses a feed document already in memory.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let feed = feed_rs::parser::parse(bytes).map_err(|e| FeedError::Parse(e.to_string()))?;
        let feed = ParsedFeed::from(feed);

        tracing::debug!(entries = feed.entries.len(), "Feed parsed");
        self.feed = Some(feed);
        Ok(self)
    }

    /// The loaded feed.
    pub fn get(&self) -> Result<&ParsedFeed> {
        self.feed.as_ref().ok_or(FeedError::NotLoaded)
    }

    /// One new `T` per entry of the loaded feed, filled by the hydrator.
    pub fn populate<T>(&self) -> Result<Vec<T>>
    where
        T: ItemInterface + Default,
    {
        let feed = self.get()?;

        let mut items = Vec::with_capacity(feed.entries.len());
        for entry in &feed.entries {
            let mut item = T::default();
            self.hydrator.hydrate(entry, &mut item)?;
            items.push(item);
        }

        tracing::debug!(items = items.len(), "Entities hydrated");
        Ok(items)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("loaded", &self.feed.is_some())
            .field("remote", &self.remote.is_some())
            .finish_non_exhaustive()
    }
}
