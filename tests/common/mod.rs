//! Fake entities and capabilities shared by the integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use quick_xml::events::Event;

use feedkit::error::{FeedError, Result};
use feedkit::item::AccessorRegistry;
use feedkit::routing::RouteParams;
use feedkit::{
    FeedConfig, FeedManager, FormatterRegistry, IdentityTranslator, ItemInterface, LinkGenerator,
    Media, RoutedItemInterface, Translator, Value,
};

pub const ITEM_LINK: &str = "http://github.com/eko/FeedBundle/article/fake/url";

pub const ROUTED_LINK: &str = "http://github.com/eko/FeedBundle/article/fake/url?utm_source=mysource&utm_medium=mymedium&utm_campaign=mycampaign&utm_content=mycontent";

pub fn pub_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
}

/// An entity exposing every custom accessor the formatter tests use.
#[derive(Debug, Clone, Default)]
pub struct FakeItem {
    pub media: Option<Media>,
}

impl FakeItem {
    pub fn with_media(media: Media) -> Self {
        Self { media: Some(media) }
    }
}

impl ItemInterface for FakeItem {
    fn feed_item_title(&self) -> String {
        "Fake title".to_string()
    }

    fn feed_item_description(&self) -> String {
        "Fake description or content".to_string()
    }

    fn feed_item_link(&self) -> String {
        ITEM_LINK.to_string()
    }

    fn feed_item_pub_date(&self) -> DateTime<Utc> {
        pub_date()
    }

    fn accessors() -> AccessorRegistry<Self> {
        AccessorRegistry::new()
            .with("feed_item_custom", |_: &Self| Some("My custom field".into()))
            .with("feed_item_author_name", |_: &Self| Some("John Doe".into()))
            .with("feed_item_author_email", |_: &Self| {
                Some("john.doe@example.org".into())
            })
            .with("feed_media_item", |item: &Self| item.media.clone().map(Value::from))
            .with("feed_media_multiple_items", |_: &Self| {
                Some(Value::from(vec![
                    Media::new("image/jpeg", 500, "http://website.com/image.jpg"),
                    Media::new("image/png", 600, "http://website.com/image2.png"),
                ]))
            })
            .with("feed_media_broken", |_: &Self| {
                let mut map = BTreeMap::new();
                map.insert("type".to_string(), Value::from("image/png"));
                map.insert("value".to_string(), Value::from("http://website.com/a.png"));
                Some(Value::Map(map))
            })
            .with("feed_categories_custom", |_: &Self| {
                Some(Value::from(vec!["category 1", "category 2", "category 3"]))
            })
            .with("get_item_key_attribute", |_: &Self| {
                Some("my-item-key-attribute".into())
            })
            .with("get_item_value_attribute", |_: &Self| {
                Some("my-item-value-attribute".into())
            })
            .with("get_group_key_attribute", |_: &Self| {
                Some("my-group-key-attribute".into())
            })
            .with("get_group_value_attribute", |_: &Self| {
                Some("my-group-value-attribute".into())
            })
    }
}

/// An entity whose link comes from the `fake_route` route.
#[derive(Debug, Clone, Default)]
pub struct FakeRoutedItem;

impl RoutedItemInterface for FakeRoutedItem {
    fn feed_item_title(&self) -> String {
        "Fake title".to_string()
    }

    fn feed_item_description(&self) -> String {
        "Fake description or content".to_string()
    }

    fn feed_item_route_name(&self) -> String {
        "fake_route".to_string()
    }

    fn feed_item_url_anchor(&self) -> Option<String> {
        Some("fake-anchor".to_string())
    }

    fn feed_item_pub_date(&self) -> DateTime<Utc> {
        pub_date()
    }

    fn accessors() -> AccessorRegistry<Self> {
        AccessorRegistry::new().with("feed_item_custom", |_: &Self| Some("My custom field".into()))
    }
}

/// Answers `fake_route` with a fixed URL carrying a query string.
pub struct StubRouter;

impl LinkGenerator for StubRouter {
    fn generate(&self, route: &str, params: &RouteParams, absolute: bool) -> Result<String> {
        match route {
            "fake_route" if params.is_empty() && absolute => Ok(ROUTED_LINK.to_string()),
            other => Err(FeedError::UnknownRoute(other.to_string())),
        }
    }
}

/// Translates everything to the same token.
pub struct StubTranslator;

impl Translator for StubTranslator {
    fn trans(&self, _value: &str, _domain: Option<&str>) -> String {
        "translatable-value".to_string()
    }
}

pub fn article_config() -> FeedConfig {
    FeedConfig::new(
        "My articles/posts",
        "Latests articles",
        "http://github.com/eko/FeedBundle",
    )
    .with_author("Vincent Composieux")
}

pub fn manager_with(config: FeedConfig, translator: Arc<dyn Translator>) -> FeedManager {
    let mut configs = BTreeMap::new();
    configs.insert("article".to_string(), config);

    let formatters = FormatterRegistry::with_defaults(translator, Some("test".to_string()));
    FeedManager::new(configs, Arc::new(formatters), Some(Arc::new(StubRouter)))
}

pub fn manager() -> FeedManager {
    manager_with(article_config(), Arc::new(IdentityTranslator))
}

/// Parses `xml` completely, panicking on the first syntax error.
pub fn assert_well_formed(xml: &str) {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed XML at {}: {}\n{}", reader.buffer_position(), e, xml),
        }
    }
    assert_eq!(depth, 0, "unbalanced XML:\n{}", xml);
}

/// Text content (text and CDATA, concatenated) of every `name` element, in
/// document order.
pub fn element_texts(xml: &str, name: &str) -> Vec<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == name.as_bytes() => {
                current = Some(String::new());
            }
            Event::Empty(e) if e.name().as_ref() == name.as_bytes() => {
                texts.push(String::new());
            }
            Event::End(e) if e.name().as_ref() == name.as_bytes() => {
                if let Some(text) = current.take() {
                    texts.push(text);
                }
            }
            Event::Text(e) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&e.unescape().unwrap());
                }
            }
            Event::CData(e) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(std::str::from_utf8(&e.into_inner()).unwrap());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    texts
}
