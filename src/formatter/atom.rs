use std::sync::Arc;

use chrono::Utc;

use crate::error::{FeedError, Result};
use crate::feed::Feed;
use crate::field::{FieldOptions, ItemField};
use crate::item::accessor;
use crate::translation::Translator;
use crate::xml::{Document, Element};

use super::{format_date, Builder, EnclosureStyle, Formatter, FormatterBase, ATOM_DATE_FORMAT};

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Atom 1.0: `<feed xmlns="http://www.w3.org/2005/Atom">...<entry>...</entry></feed>`.
///
/// Requires a non-empty `author` in the feed configuration.
#[derive(Debug)]
pub struct AtomFormatter {
    base: FormatterBase,
}

impl AtomFormatter {
    pub fn new(translator: Arc<dyn Translator>, domain: Option<String>) -> Self {
        let item_fields = vec![
            ItemField::new("id", accessor::LINK).into(),
            ItemField::new("title", accessor::TITLE)
                .with_options(FieldOptions::new().cdata())
                .into(),
            ItemField::new("summary", accessor::DESCRIPTION)
                .with_options(FieldOptions::new().cdata())
                .with_attributes([("type", "html")])
                .into(),
            ItemField::new("link", accessor::LINK)
                .with_options(FieldOptions::new().attribute("href"))
                .into(),
            ItemField::new("updated", accessor::PUB_DATE)
                .with_options(FieldOptions::new().date_format(ATOM_DATE_FORMAT))
                .into(),
        ];

        Self {
            base: FormatterBase::new("atom", translator, domain, item_fields, EnclosureStyle::Link),
        }
    }
}

impl Formatter for AtomFormatter {
    fn base(&self) -> &FormatterBase {
        &self.base
    }

    fn validate(&self, feed: &Feed) -> Result<()> {
        match feed.author() {
            Some(author) if !author.is_empty() => Ok(()),
            _ => Err(FeedError::MissingAuthor),
        }
    }

    fn initialize(&self, builder: &Builder<'_>) -> Result<Document> {
        let feed = builder.feed();
        let link = feed.link()?;

        let mut root = Element::new("feed");
        root.set_attribute("xmlns", ATOM_NAMESPACE);

        root.append(Element::with_text("title", builder.translate(feed.title())));
        root.append(Element::with_text(
            "subtitle",
            builder.translate(feed.description()),
        ));

        let mut self_link = Element::new("link");
        self_link.set_attribute("href", link.as_str());
        self_link.set_attribute("rel", "self");
        self_link.set_attribute("type", "application/rss+xml");
        root.append(self_link);

        root.append(Element::with_text(
            "updated",
            format_date(&Utc::now(), ATOM_DATE_FORMAT)?,
        ));
        root.append(Element::with_text("id", link));

        let mut author = Element::new("author");
        author.append(Element::with_text("name", feed.author().unwrap_or_default()));
        root.append(author);

        builder.add_channel_fields(&mut root)?;
        builder.add_items(&mut root, "entry")?;

        Ok(Document::new(feed.encoding(), root))
    }
}
