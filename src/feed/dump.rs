use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{FeedError, Result};
use crate::item::FeedItem;
use crate::util::write_atomic;
use crate::value::Value;

use super::FeedManager;

/// Sort direction of a repository query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(FeedError::InvalidDirection),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

/// Field equality filters of a repository query.
pub type Criteria = BTreeMap<String, Value>;

/// A single-key ordering: `{field: direction}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Query capability over one entity type.
pub trait Repository {
    fn find_by(
        &self,
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<Box<dyn FeedItem>>>;
}

/// Resolves entity names to repositories.
pub trait EntityManager {
    fn repository(&self, entity: &str) -> Result<Box<dyn Repository + '_>>;
}

/// Where dumped feeds are written.
pub trait Filesystem {
    fn dump_file(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Writes to the local disk through a temporary file and a rename.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn dump_file(&self, path: &Path, contents: &str) -> Result<()> {
        write_atomic(path, contents.as_bytes())?;
        Ok(())
    }
}

/// Renders a named feed, from repository entities or preset items, into a
/// file under a root directory.
pub struct FeedDumpService<E, F = LocalFilesystem> {
    manager: FeedManager,
    entity_manager: E,
    filesystem: F,
    name: Option<String>,
    entity: Option<String>,
    filename: Option<String>,
    format: String,
    limit: Option<usize>,
    direction: Option<String>,
    order_by: Option<String>,
    root_dir: PathBuf,
}

impl<E: EntityManager, F: Filesystem> FeedDumpService<E, F> {
    pub fn new(manager: FeedManager, entity_manager: E, filesystem: F) -> Self {
        Self {
            manager,
            entity_manager,
            filesystem,
            name: None,
            entity: None,
            filename: None,
            format: "rss".to_string(),
            limit: None,
            direction: None,
            order_by: None,
            root_dir: PathBuf::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_entity(&mut self, entity: impl Into<String>) -> &mut Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) -> &mut Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn set_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.format = format.into();
        self
    }

    pub fn set_limit(&mut self, limit: Option<usize>) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn set_direction(&mut self, direction: Option<String>) -> &mut Self {
        self.direction = direction;
        self
    }

    pub fn set_order_by(&mut self, order_by: Option<String>) -> &mut Self {
        self.order_by = order_by;
        self
    }

    pub fn set_root_dir(&mut self, root_dir: impl Into<PathBuf>) -> &mut Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Adds `items` to the named feed. The name must be set first.
    pub fn set_items(&mut self, items: Vec<Box<dyn FeedItem>>) -> Result<&mut Self> {
        let name = self.name.as_deref().ok_or(FeedError::MissingDumpOption("name"))?;
        self.manager.get(name)?.extend(items);
        Ok(self)
    }

    pub fn manager(&mut self) -> &mut FeedManager {
        &mut self.manager
    }

    /// The ordering to query with. A direction other than `ASC` or `DESC`
    /// is refused whenever an order field is set.
    pub fn order_by(&self) -> Result<Option<OrderBy>> {
        let Some(field) = &self.order_by else {
            return Ok(None);
        };

        let direction = self
            .direction
            .as_deref()
            .ok_or(FeedError::InvalidDirection)?
            .parse()?;

        Ok(Some(OrderBy {
            field: field.clone(),
            direction,
        }))
    }

    /// Renders the feed and writes it to `root_dir/filename`, returning the
    /// written path.
    pub fn dump(&mut self) -> Result<PathBuf> {
        let order_by = self.order_by()?;

        let name = self.name.as_deref().ok_or(FeedError::MissingDumpOption("name"))?;
        let filename = self
            .filename
            .as_deref()
            .ok_or(FeedError::MissingDumpOption("filename"))?;

        let feed = self.manager.get(name)?;

        if let Some(entity) = &self.entity {
            let repository = self.entity_manager.repository(entity)?;
            let items = repository.find_by(&Criteria::new(), order_by.as_ref(), self.limit)?;
            tracing::debug!(entity = %entity, items = items.len(), "Loaded entities");
            feed.extend(items);
        } else if !feed.has_items() {
            return Err(FeedError::NothingToDump);
        }

        let xml = feed.render(&self.format)?;
        let path = self.root_dir.join(filename);
        self.filesystem.dump_file(&path, &xml)?;

        tracing::info!(
            feed = %name,
            format = %self.format,
            path = %path.display(),
            "Feed dumped"
        );
        Ok(path)
    }
}

impl<E, F> fmt::Debug for FeedDumpService<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedDumpService")
            .field("name", &self.name)
            .field("entity", &self.entity)
            .field("filename", &self.filename)
            .field("format", &self.format)
            .field("limit", &self.limit)
            .field("direction", &self.direction)
            .field("order_by", &self.order_by)
            .field("root_dir", &self.root_dir)
            .finish_non_exhaustive()
    }
}
