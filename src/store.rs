//! JSON-backed entity storage used by the `dump` command.
//!
//! Each entity lives in `<data_dir>/<entity>.json` as an array of records:
//!
//! ```json
//! [
//!   {
//!     "title": "Hello",
//!     "description": "First post",
//!     "link": { "route_name": "article", "route_params": { "id": "1" } },
//!     "pub_date": "2024-05-01T12:00:00Z",
//!     "category": ["news", "rust"]
//!   }
//! ]
//! ```
//!
//! `link` is either a URI or a route resolved through the link generator.
//! Any other key is exposed to custom fields as an accessor of the same name.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{FeedError, Result};
use crate::feed::{Criteria, Direction, EntityManager, OrderBy, Repository};
use crate::item::{accessor, FeedItem};
use crate::routing::{routed_link, LinkGenerator, RouteParams};
use crate::value::Value;

/// SEC-014: Maximum entity file size (16 MB).
const MAX_FILE_SIZE: u64 = 16 * 1_048_576;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecordLink {
    Uri(String),
    Route {
        route_name: String,
        #[serde(default)]
        route_params: RouteParams,
        #[serde(default)]
        anchor: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Record {
    title: String,
    #[serde(default)]
    description: String,
    link: RecordLink,
    pub_date: DateTime<Utc>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Value of a record field by its JSON key.
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "title" => Some(Value::from(self.title.as_str())),
            "description" => Some(Value::from(self.description.as_str())),
            "pub_date" => Some(Value::Date(self.pub_date)),
            "link" => match &self.link {
                RecordLink::Uri(uri) => Some(Value::from(uri.as_str())),
                RecordLink::Route { .. } => None,
            },
            other => self.extra.get(other).and_then(json_value),
        }
    }
}

fn json_value(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Text(b.to_string())),
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Text(n.to_string()),
        }),
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Array(values) => {
            Some(Value::List(values.iter().filter_map(json_value).collect()))
        }
        serde_json::Value::Object(map) => Some(Value::Map(
            map.iter()
                .filter_map(|(k, v)| json_value(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Date(a)), Some(Value::Date(b))) => a.cmp(b),
        (Some(Value::Integer(a)), Some(Value::Integer(b))) => a.cmp(b),
        (Some(a), Some(b)) => a.as_text().cmp(&b.as_text()),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Entity manager reading `<data_dir>/<entity>.json`.
pub struct JsonEntityManager {
    data_dir: PathBuf,
    router: Option<Arc<dyn LinkGenerator>>,
}

impl JsonEntityManager {
    pub fn new(data_dir: impl Into<PathBuf>, router: Option<Arc<dyn LinkGenerator>>) -> Self {
        Self {
            data_dir: data_dir.into(),
            router,
        }
    }
}

impl EntityManager for JsonEntityManager {
    fn repository(&self, entity: &str) -> Result<Box<dyn Repository + '_>> {
        let valid = !entity.is_empty()
            && entity
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FeedError::InvalidSource {
                source_str: entity.to_string(),
                reason: "entity names may only contain letters, digits, '_' and '-'".to_string(),
            });
        }

        let path = self.data_dir.join(format!("{}.json", entity));
        let size = std::fs::metadata(&path)?.len();
        if size > MAX_FILE_SIZE {
            return Err(FeedError::InvalidSource {
                source_str: path.display().to_string(),
                reason: format!("file is {} bytes (max {} bytes)", size, MAX_FILE_SIZE),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let records: Vec<Record> = serde_json::from_str(&content)
            .map_err(|e| FeedError::Parse(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(entity = %entity, records = records.len(), "Loaded entity records");

        Ok(Box::new(JsonRepository {
            records,
            router: self.router.clone(),
        }))
    }
}

struct JsonRepository {
    records: Vec<Record>,
    router: Option<Arc<dyn LinkGenerator>>,
}

impl Repository for JsonRepository {
    fn find_by(
        &self,
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<Box<dyn FeedItem>>> {
        let mut records: Vec<&Record> = self
            .records
            .iter()
            .filter(|record| {
                criteria
                    .iter()
                    .all(|(key, expected)| record.field(key).as_ref() == Some(expected))
            })
            .collect();

        if let Some(order) = order_by {
            records.sort_by(|a, b| {
                let ordering = compare(a.field(&order.field).as_ref(), b.field(&order.field).as_ref());
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        Ok(records
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|record| {
                Box::new(RecordItem {
                    record: record.clone(),
                    router: self.router.clone(),
                }) as Box<dyn FeedItem>
            })
            .collect())
    }
}

struct RecordItem {
    record: Record,
    router: Option<Arc<dyn LinkGenerator>>,
}

impl RecordItem {
    fn link(&self) -> Result<String> {
        match &self.record.link {
            RecordLink::Uri(uri) => Ok(uri.clone()),
            RecordLink::Route {
                route_name,
                route_params,
                anchor,
            } => {
                let router = self
                    .router
                    .as_ref()
                    .ok_or_else(|| FeedError::MissingLinkGenerator(route_name.clone()))?;
                routed_link(router.as_ref(), route_name, route_params, anchor.as_deref())
            }
        }
    }
}

impl FeedItem for RecordItem {
    fn call(&self, name: &str) -> Result<Option<Value>> {
        match name {
            accessor::TITLE => Ok(self.record.field("title")),
            accessor::DESCRIPTION => Ok(self.record.field("description")),
            accessor::LINK => self.link().map(|link| Some(Value::Text(link))),
            accessor::PUB_DATE => Ok(self.record.field("pub_date")),
            other => match self.record.extra.get(other) {
                Some(value) => Ok(json_value(value)),
                None => Err(FeedError::AccessorNotFound(other.to_string())),
            },
        }
    }

    fn responds_to(&self, name: &str) -> bool {
        matches!(
            name,
            accessor::TITLE | accessor::DESCRIPTION | accessor::LINK | accessor::PUB_DATE
        ) || self.record.extra.contains_key(name)
    }
}
