use crate::error::Result;
use crate::item::reader::ItemInterface;

use super::reader::ParsedEntry;

/// Maps one parsed entry onto a freshly constructed entity.
pub trait Hydrator: Send + Sync {
    fn hydrate(&self, entry: &ParsedEntry, item: &mut dyn ItemInterface) -> Result<()>;
}

/// Copies title, content, link and modification date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHydrator;

impl Hydrator for DefaultHydrator {
    fn hydrate(&self, entry: &ParsedEntry, item: &mut dyn ItemInterface) -> Result<()> {
        item.set_feed_item_title(entry.title.clone());
        item.set_feed_item_description(entry.content.clone());
        item.set_feed_item_link(entry.link.clone().unwrap_or_default());
        item.set_feed_item_pub_date(entry.updated);
        Ok(())
    }
}
