use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{FeedError, Result};
use crate::translation::Translator;

use super::{AtomFormatter, Formatter, RssFormatter};

/// Formatters keyed by format name.
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: BTreeMap<String, Arc<dyn Formatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `rss` and `atom`.
    pub fn with_defaults(translator: Arc<dyn Translator>, domain: Option<String>) -> Self {
        let mut registry = Self::new();
        registry.add_formatter(
            "rss",
            Arc::new(RssFormatter::new(translator.clone(), domain.clone())),
        );
        registry.add_formatter("atom", Arc::new(AtomFormatter::new(translator, domain)));
        registry
    }

    /// Registers `formatter` under `format`, replacing any previous one.
    pub fn add_formatter(&mut self, format: impl Into<String>, formatter: Arc<dyn Formatter>) {
        self.formatters.insert(format.into(), formatter);
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.formatters.contains_key(format)
    }

    pub fn get_formatter(&self, format: &str) -> Result<Arc<dyn Formatter>> {
        self.formatters
            .get(format)
            .cloned()
            .ok_or_else(|| FeedError::UnknownFormat(format.to_string()))
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formats", &self.formatters.keys().collect::<Vec<_>>())
            .finish()
    }
}
