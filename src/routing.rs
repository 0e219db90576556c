//! Link generation capability.
//!
//! Feeds and routed items do not store links; they name a route and its
//! parameters and ask a [`LinkGenerator`] for the URL at render time.
use std::collections::BTreeMap;

use crate::error::{FeedError, Result};

pub type RouteParams = BTreeMap<String, String>;

pub trait LinkGenerator: Send + Sync {
    /// Builds the URL for `route`. `absolute` asks for scheme and host.
    fn generate(&self, route: &str, params: &RouteParams, absolute: bool) -> Result<String>;
}

/// Generates an absolute link for a routed entity, appending `#anchor` when
/// the entity supplies a non-empty one.
pub fn routed_link(
    generator: &dyn LinkGenerator,
    route: &str,
    params: &RouteParams,
    anchor: Option<&str>,
) -> Result<String> {
    let mut link = generator.generate(route, params, true)?;
    if let Some(anchor) = anchor.filter(|a| !a.is_empty()) {
        link.push('#');
        link.push_str(anchor);
    }
    Ok(link)
}

/// Route templates such as `/article/{id}` bound to one host.
///
/// Placeholders are replaced by parameters of the same name; parameters
/// that match no placeholder are appended as a query string.
#[derive(Debug, Clone)]
pub struct RouteTable {
    base: String,
    routes: BTreeMap<String, String>,
}

impl RouteTable {
    /// `host` is either a bare host (`example.com`, served over http) or a
    /// full origin (`https://example.com`).
    pub fn new(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        let base = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        Self {
            base,
            routes: BTreeMap::new(),
        }
    }

    pub fn with_route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.routes.insert(name.into(), template.into());
        self
    }

    pub fn with_routes<I, K, V>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.routes
            .extend(routes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl LinkGenerator for RouteTable {
    fn generate(&self, route: &str, params: &RouteParams, absolute: bool) -> Result<String> {
        let template = self
            .routes
            .get(route)
            .ok_or_else(|| FeedError::UnknownRoute(route.to_string()))?;

        let mut path = String::with_capacity(template.len());
        let mut used = Vec::new();
        let mut rest = template.as_str();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|c| open + c) else {
                break;
            };
            let name = &rest[open + 1..close];
            let value = params
                .get(name)
                .ok_or_else(|| FeedError::MissingRouteParameter {
                    route: route.to_string(),
                    parameter: name.to_string(),
                })?;

            path.push_str(&rest[..open]);
            path.push_str(&encode_segment(value));
            used.push(name);
            rest = &rest[close + 1..];
        }
        path.push_str(rest);

        let extra: Vec<(&String, &String)> = params
            .iter()
            .filter(|(k, _)| !used.contains(&k.as_str()))
            .collect();
        if !extra.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(extra)
                .finish();
            path.push('?');
            path.push_str(&query);
        }

        if absolute {
            Ok(format!("{}{}", self.base, path))
        } else {
            Ok(path)
        }
    }
}

/// Percent-encodes `value` for use inside one path segment, so `/`, `#`,
/// `?` and spaces cannot change the shape of the URL.
fn encode_segment(value: &str) -> String {
    // byte_serialize writes a space as `+`; a literal `+` comes out as `%2B`
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
