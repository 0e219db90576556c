use chrono::{DateTime, Utc};

/// An entity that can be populated from a parsed feed entry.
pub trait ItemInterface {
    fn set_feed_item_title(&mut self, title: String);

    fn set_feed_item_description(&mut self, description: String);

    fn set_feed_item_link(&mut self, link: String);

    /// `None` when the entry carries no date.
    fn set_feed_item_pub_date(&mut self, date: Option<DateTime<Utc>>);
}
