//! Translation capability used for `translatable` fields and channel titles.
use std::collections::BTreeMap;

/// Domain used by catalogs when the caller passes none.
pub const DEFAULT_DOMAIN: &str = "messages";

pub trait Translator: Send + Sync {
    fn trans(&self, value: &str, domain: Option<&str>) -> String;
}

/// Returns every value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn trans(&self, value: &str, _domain: Option<&str>) -> String {
        value.to_string()
    }
}

/// Message catalogs keyed by domain, then by source string. Unknown messages
/// are returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    catalogs: BTreeMap<String, BTreeMap<String, String>>,
}

impl CatalogTranslator {
    pub fn new(catalogs: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { catalogs }
    }

    pub fn insert(
        &mut self,
        domain: impl Into<String>,
        message: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.catalogs
            .entry(domain.into())
            .or_default()
            .insert(message.into(), translation.into());
    }
}

impl Translator for CatalogTranslator {
    fn trans(&self, value: &str, domain: Option<&str>) -> String {
        self.catalogs
            .get(domain.unwrap_or(DEFAULT_DOMAIN))
            .and_then(|catalog| catalog.get(value))
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }
}
