//! Feed lookup, caching and routed links through `FeedManager`.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{assert_well_formed, element_texts, manager, FakeItem, FakeRoutedItem};
use feedkit::error::{ErrorKind, FeedError};
use feedkit::{Config, FeedManager, Link, LinkGenerator, RouteTable};

const CONFIG: &str = r#"
translation_domain = "feeds"

[feeds.article]
title = "article.title"
description = "Latests articles"
link = { route_name = "home" }
author = "Vincent Composieux"

[feeds.news]
title = "News"
description = "Latest news"
link = "http://example.com/news"
encoding = "iso-8859-1"
ttl = "60"

[routes]
home = "/"
article = "/article/{id}"

[translations.feeds]
"article.title" = "My articles/posts"
"#;

fn configured(router: bool) -> FeedManager {
    let config = Config::parse(CONFIG).unwrap();
    let router = router.then(|| {
        Arc::new(RouteTable::new("example.com").with_routes(config.routes.clone()))
            as Arc<dyn LinkGenerator>
    });
    FeedManager::from_config(&config, router)
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_has_and_names() {
    let manager = configured(true);

    assert!(manager.has("article"));
    assert!(manager.has("news"));
    assert!(!manager.has("unknown"));
    assert_eq!(manager.names().collect::<Vec<_>>(), vec!["article", "news"]);
}

#[test]
fn test_unknown_feed() {
    let mut manager = configured(true);

    let err = manager.get("unknown").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Specified feed 'unknown' is not defined in your configuration."
    );
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(manager.create("unknown"), Err(FeedError::FeedNotConfigured(_))));
}

#[test]
fn test_default_formats_are_registered() {
    let manager = configured(true);

    assert_eq!(manager.formatters().formats().collect::<Vec<_>>(), vec!["atom", "rss"]);
    assert!(manager.formatters().supports_format("rss"));
    assert!(!manager.formatters().supports_format("json"));
}

#[test]
fn test_unknown_format() {
    let mut manager = configured(true);
    let feed = manager.get("news").unwrap();
    feed.add(FakeItem::default());

    let err = feed.render("json").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to find a formatter service for format \"json\"."
    );
    assert_eq!(feed.get_items().len(), 1);
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_get_returns_the_same_feed() {
    let mut manager = configured(true);

    manager.get("news").unwrap().add(FakeItem::default());
    manager.get("news").unwrap().add(FakeItem::default());

    assert_eq!(manager.get("news").unwrap().get_items().len(), 2);
}

#[test]
fn test_create_returns_a_fresh_feed() {
    let mut manager = configured(true);
    manager.get("news").unwrap().add(FakeItem::default());

    let fresh = manager.create("news").unwrap();
    assert!(!fresh.has_items());
    assert_eq!(manager.get("news").unwrap().get_items().len(), 1);
}

// ============================================================================
// Configuration parameters
// ============================================================================

#[test]
fn test_parameters_from_config() {
    let mut manager = configured(true);
    let feed = manager.get("news").unwrap();

    assert_eq!(feed.get("title").unwrap().as_deref(), Some("News"));
    assert_eq!(feed.get("encoding").unwrap().as_deref(), Some("iso-8859-1"));
    assert_eq!(feed.get("ttl").unwrap().as_deref(), Some("60"));
    assert_eq!(feed.get("author").unwrap(), None);
    assert_eq!(feed.get_or("author", "nobody").unwrap(), "nobody");

    let xml = feed.render("rss").unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>"));
}

#[test]
fn test_set_and_unset_parameters() {
    let mut manager = configured(true);
    let feed = manager.get("news").unwrap();

    feed.set("title", "Breaking").set("author", "Editor");
    assert_eq!(feed.title(), "Breaking");
    assert_eq!(feed.author(), Some("Editor"));

    feed.unset("author").unset("ttl");
    assert_eq!(feed.author(), None);
    assert_eq!(feed.get("ttl").unwrap(), None);

    // Changes stay on this feed, not on the configuration.
    assert_eq!(manager.create("news").unwrap().title(), "News");
}

// ============================================================================
// Routes and translations
// ============================================================================

#[test]
fn test_route_link_and_translated_title() {
    let mut manager = configured(true);
    let feed = manager.get("article").unwrap();
    feed.add(FakeItem::default());

    assert_eq!(feed.link().unwrap(), "http://example.com/");

    let xml = feed.render("atom").unwrap();
    assert_well_formed(&xml);
    assert_eq!(element_texts(&xml, "title")[0], "My articles/posts");
    assert!(xml.contains("<link href=\"http://example.com/\" rel=\"self\""));
}

#[test]
fn test_route_link_without_router() {
    let mut manager = configured(false);
    let feed = manager.get("article").unwrap();

    assert!(matches!(feed.link(), Err(FeedError::MissingLinkGenerator(route)) if route == "home"));
    assert!(feed.render("rss").is_err());
    assert!(matches!(
        feed.add_routed(FakeRoutedItem),
        Err(FeedError::MissingLinkGenerator(_))
    ));
    assert!(!feed.has_items());
}

#[test]
fn test_set_link_overrides_route() {
    let mut manager = configured(false);
    let feed = manager.get("article").unwrap();
    feed.set_link(Link::Uri("http://example.org/".to_string()));

    assert_eq!(feed.link().unwrap(), "http://example.org/");
    assert!(feed.render("rss").is_ok());
}

#[test]
fn test_programmatic_manager() {
    let mut manager = manager();
    let feed = manager.get("article").unwrap();
    feed.add(FakeItem::default()).add_routed(FakeRoutedItem).unwrap();

    let xml = feed.render("rss").unwrap();
    assert_well_formed(&xml);
    assert_eq!(element_texts(&xml, "item").len(), 2);
}
