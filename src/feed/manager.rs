use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::config::{Config, FeedConfig};
use crate::error::{FeedError, Result};
use crate::formatter::FormatterRegistry;
use crate::routing::LinkGenerator;
use crate::translation::{CatalogTranslator, IdentityTranslator, Translator};

use super::Feed;

/// Builds [`Feed`]s from named configuration sections.
///
/// [`FeedManager::get`] caches one feed per name for the manager's lifetime,
/// so items added through it accumulate across calls. Use
/// [`FeedManager::create`] for a fresh feed per use.
pub struct FeedManager {
    configs: BTreeMap<String, FeedConfig>,
    formatters: Arc<FormatterRegistry>,
    router: Option<Arc<dyn LinkGenerator>>,
    feeds: HashMap<String, Feed>,
}

impl FeedManager {
    pub fn new(
        configs: BTreeMap<String, FeedConfig>,
        formatters: Arc<FormatterRegistry>,
        router: Option<Arc<dyn LinkGenerator>>,
    ) -> Self {
        Self {
            configs,
            formatters,
            router,
            feeds: HashMap::new(),
        }
    }

    /// Manager over the `[feeds]` section of `config`, with the default
    /// formatters translating through the configured catalogs.
    pub fn from_config(config: &Config, router: Option<Arc<dyn LinkGenerator>>) -> Self {
        let translator: Arc<dyn Translator> = if config.translations.is_empty() {
            Arc::new(IdentityTranslator)
        } else {
            Arc::new(CatalogTranslator::new(config.translations.clone()))
        };

        let formatters =
            FormatterRegistry::with_defaults(translator, config.translation_domain.clone());

        Self::new(config.feeds.clone(), Arc::new(formatters), router)
    }

    pub fn has(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// The cached feed named `name`, built on first use.
    pub fn get(&mut self, name: &str) -> Result<&mut Feed> {
        if !self.feeds.contains_key(name) {
            let feed = self.create(name)?;
            self.feeds.insert(name.to_string(), feed);
        }

        self.feeds
            .get_mut(name)
            .ok_or_else(|| FeedError::FeedNotConfigured(name.to_string()))
    }

    /// A new feed named `name`, independent of the cache.
    pub fn create(&self, name: &str) -> Result<Feed> {
        let config = self
            .configs
            .get(name)
            .ok_or_else(|| FeedError::FeedNotConfigured(name.to_string()))?;

        tracing::debug!(feed = %name, "Building feed");

        let feed = Feed::new(name, config.clone(), Arc::clone(&self.formatters));
        Ok(match &self.router {
            Some(router) => feed.with_router(Arc::clone(router)),
            None => feed,
        })
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }
}

impl fmt::Debug for FeedManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedManager")
            .field("feeds", &self.configs.keys().collect::<Vec<_>>())
            .field("cached", &self.feeds.len())
            .field("formatters", &self.formatters)
            .finish_non_exhaustive()
    }
}
