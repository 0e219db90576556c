use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::routing::{routed_link, LinkGenerator};
use crate::value::Value;

use super::writer::{accessor, AccessorRegistry, FeedItem, RoutedItemInterface};

/// Presents a [`RoutedItemInterface`] entity as a plain renderable item.
///
/// Title, description and publication date are forwarded; the link is
/// generated through the link generator. Any other accessor goes through the
/// entity's own registry.
pub struct ProxyItem<T> {
    item: T,
    accessors: AccessorRegistry<T>,
    router: Arc<dyn LinkGenerator>,
}

impl<T: RoutedItemInterface> ProxyItem<T> {
    pub fn new(item: T, router: Arc<dyn LinkGenerator>) -> Self {
        Self {
            item,
            accessors: T::accessors(),
            router,
        }
    }

    pub fn feed_item_link(&self) -> Result<String> {
        let anchor = self.item.feed_item_url_anchor();
        routed_link(
            self.router.as_ref(),
            &self.item.feed_item_route_name(),
            &self.item.feed_item_route_parameters(),
            anchor.as_deref(),
        )
    }
}

impl<T: RoutedItemInterface> FeedItem for ProxyItem<T> {
    fn call(&self, name: &str) -> Result<Option<Value>> {
        match name {
            accessor::TITLE => Ok(Some(self.item.feed_item_title().into())),
            accessor::DESCRIPTION => Ok(Some(self.item.feed_item_description().into())),
            accessor::LINK => self.feed_item_link().map(|link| Some(link.into())),
            accessor::PUB_DATE => Ok(Some(self.item.feed_item_pub_date().into())),
            other => self.accessors.call(&self.item, other),
        }
    }

    fn responds_to(&self, name: &str) -> bool {
        matches!(
            name,
            accessor::TITLE | accessor::DESCRIPTION | accessor::LINK | accessor::PUB_DATE
        ) || self.accessors.contains(name)
    }
}

impl<T: fmt::Debug> fmt::Debug for ProxyItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyItem")
            .field("item", &self.item)
            .field("accessors", &self.accessors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::routing::RouteParams;
    use chrono::{DateTime, TimeZone, Utc};

    struct StubRouter;

    impl LinkGenerator for StubRouter {
        fn generate(&self, route: &str, params: &RouteParams, absolute: bool) -> Result<String> {
            assert_eq!(route, "fake_route");
            assert!(params.is_empty());
            assert!(absolute);
            Ok("http://host/path".to_string())
        }
    }

    struct RoutedArticle {
        anchor: Option<String>,
    }

    impl RoutedItemInterface for RoutedArticle {
        fn feed_item_title(&self) -> String {
            "Fake title".to_string()
        }

        fn feed_item_description(&self) -> String {
            "Fake description".to_string()
        }

        fn feed_item_route_name(&self) -> String {
            "fake_route".to_string()
        }

        fn feed_item_url_anchor(&self) -> Option<String> {
            self.anchor.clone()
        }

        fn feed_item_pub_date(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        }

        fn accessors() -> AccessorRegistry<Self> {
            AccessorRegistry::new().with("feed_item_custom", |_: &Self| {
                Some("My custom field".into())
            })
        }
    }

    fn proxy(anchor: Option<&str>) -> ProxyItem<RoutedArticle> {
        ProxyItem::new(
            RoutedArticle {
                anchor: anchor.map(str::to_string),
            },
            Arc::new(StubRouter),
        )
    }

    #[test]
    fn test_link_gets_anchor() {
        assert_eq!(
            proxy(Some("sec1")).call(accessor::LINK).unwrap(),
            Some(Value::from("http://host/path#sec1"))
        );
        assert_eq!(
            proxy(None).call(accessor::LINK).unwrap(),
            Some(Value::from("http://host/path"))
        );
    }

    #[test]
    fn test_forwards_builtins_and_custom_accessors() {
        let item = proxy(None);
        assert_eq!(
            item.call(accessor::TITLE).unwrap(),
            Some(Value::from("Fake title"))
        );
        assert_eq!(
            item.call("feed_item_custom").unwrap(),
            Some(Value::from("My custom field"))
        );
        assert!(item.responds_to(accessor::PUB_DATE));
        assert!(item.responds_to("feed_item_custom"));
    }

    #[test]
    fn test_unknown_accessor_fails() {
        let err = proxy(None)
            .call("feed_item_do_not_exists_custom")
            .unwrap_err();
        assert!(matches!(err, FeedError::AccessorNotFound(_)));
        assert_eq!(
            err.to_string(),
            "Method \"feed_item_do_not_exists_custom\" should be defined in your entity."
        );
    }
}
