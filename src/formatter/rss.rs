use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::field::{FieldOptions, ItemField};
use crate::item::accessor;
use crate::translation::Translator;
use crate::xml::{Document, Element};

use super::{format_date, Builder, EnclosureStyle, Formatter, FormatterBase, RSS_DATE_FORMAT};

/// RSS 2.0: `<rss version="2.0"><channel>...<item>...</item></channel></rss>`.
#[derive(Debug)]
pub struct RssFormatter {
    base: FormatterBase,
}

impl RssFormatter {
    pub fn new(translator: Arc<dyn Translator>, domain: Option<String>) -> Self {
        let item_fields = vec![
            ItemField::new("title", accessor::TITLE)
                .with_options(FieldOptions::new().cdata())
                .into(),
            ItemField::new("description", accessor::DESCRIPTION)
                .with_options(FieldOptions::new().cdata())
                .into(),
            ItemField::new("link", accessor::LINK).into(),
            ItemField::new("pubDate", accessor::PUB_DATE)
                .with_options(FieldOptions::new().date_format(RSS_DATE_FORMAT))
                .into(),
        ];

        Self {
            base: FormatterBase::new("rss", translator, domain, item_fields, EnclosureStyle::Url),
        }
    }
}

impl Formatter for RssFormatter {
    fn base(&self) -> &FormatterBase {
        &self.base
    }

    fn initialize(&self, builder: &Builder<'_>) -> Result<Document> {
        let feed = builder.feed();

        let mut channel = Element::new("channel");
        channel.append(Element::with_text("title", builder.translate(feed.title())));
        channel.append(Element::with_text(
            "description",
            builder.translate(feed.description()),
        ));
        channel.append(Element::with_text("link", feed.link()?));
        channel.append(Element::with_text(
            "lastBuildDate",
            format_date(&Utc::now(), RSS_DATE_FORMAT)?,
        ));

        builder.add_channel_fields(&mut channel)?;
        builder.add_items(&mut channel, "item")?;

        let mut root = Element::new("rss");
        root.set_attribute("version", "2.0");
        root.append(channel);

        Ok(Document::new(feed.encoding(), root))
    }
}
