//! Format-independent rendering: walks a feed's items and field descriptors
//! and builds an XML tree.
//!
//! A [`Formatter`] owns the fixed item fields of its format. Each render
//! validates the feed, merges the feed's custom item fields after the fixed
//! ones into a fresh [`Builder`], lets the format build its document, and
//! serialises it. Nothing is kept between renders.

mod atom;
mod registry;
mod rss;

pub use atom::AtomFormatter;
pub use registry::FormatterRegistry;
pub use rss::RssFormatter;

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{FeedError, Result};
use crate::feed::Feed;
use crate::field::{
    Attributes, ChannelFieldKind, GroupItemField, ItemField, ItemFieldKind, MediaItemField,
};
use crate::item::FeedItem;
use crate::translation::Translator;
use crate::value::{MediaRef, Value};
use crate::xml::{Document, Element};

/// RFC-822 date layout used by RSS.
pub const RSS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// RFC-3339 date layout used by Atom.
pub const ATOM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Formats `date` with a `strftime` layout, rejecting invalid layouts.
pub fn format_date(date: &DateTime<Utc>, layout: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(layout))
        .map_err(|_| FeedError::InvalidDateFormat(layout.to_string()))?;
    Ok(out)
}

/// How a media descriptor's URL is attached to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnclosureStyle {
    /// `<enclosure url="..."/>`
    Url,
    /// `<link rel="enclosure" href="..."/>`
    Link,
}

/// State shared by every formatter: its format name, the translation
/// capability and the fixed item fields.
pub struct FormatterBase {
    name: String,
    translator: Arc<dyn Translator>,
    domain: Option<String>,
    item_fields: Vec<ItemFieldKind>,
    enclosure: EnclosureStyle,
}

impl FormatterBase {
    pub fn new(
        name: impl Into<String>,
        translator: Arc<dyn Translator>,
        domain: Option<String>,
        item_fields: Vec<ItemFieldKind>,
        enclosure: EnclosureStyle,
    ) -> Self {
        Self {
            name: name.into(),
            translator,
            domain,
            item_fields,
            enclosure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

impl std::fmt::Debug for FormatterBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterBase")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("item_fields", &self.item_fields.len())
            .field("enclosure", &self.enclosure)
            .finish_non_exhaustive()
    }
}

/// A feed output format.
pub trait Formatter: Send + Sync {
    fn base(&self) -> &FormatterBase;

    fn name(&self) -> &str {
        self.base().name()
    }

    /// Checks feed preconditions before any document is built.
    fn validate(&self, _feed: &Feed) -> Result<()> {
        Ok(())
    }

    /// Builds the whole document: header, channel metadata, channel fields
    /// and one element per item.
    fn initialize(&self, builder: &Builder<'_>) -> Result<Document>;

    /// Validates `feed` and prepares a builder over the merged field list.
    fn set_feed<'a>(&'a self, feed: &'a Feed) -> Result<Builder<'a>> {
        self.validate(feed)?;
        Ok(Builder::new(self.base(), feed))
    }

    fn render(&self, feed: &Feed) -> Result<String> {
        tracing::debug!(
            format = %self.name(),
            items = feed.get_items().len(),
            "Rendering feed"
        );

        let builder = self.set_feed(feed)?;
        let document = self.initialize(&builder)?;
        let xml = document.to_xml()?;

        tracing::debug!(format = %self.name(), bytes = xml.len(), "Feed rendered");
        Ok(xml)
    }
}

/// One render in progress: the feed being rendered and the fixed fields of
/// the format followed by the feed's custom item fields.
pub struct Builder<'a> {
    base: &'a FormatterBase,
    feed: &'a Feed,
    fields: Vec<&'a ItemFieldKind>,
}

impl<'a> Builder<'a> {
    fn new(base: &'a FormatterBase, feed: &'a Feed) -> Self {
        let fields = base
            .item_fields
            .iter()
            .chain(feed.get_item_fields())
            .collect();

        Self { base, feed, fields }
    }

    pub fn feed(&self) -> &'a Feed {
        self.feed
    }

    pub fn translate(&self, value: &str) -> String {
        self.base.translator.trans(value, self.base.domain())
    }

    /// Appends the feed's channel fields to `parent`. Attributes are used
    /// literally.
    pub fn add_channel_fields(&self, parent: &mut Element) -> Result<()> {
        for field in self.feed.get_channel_fields() {
            let element = match field {
                ChannelFieldKind::Simple(field) => {
                    let mut element = Element::with_text(&field.name, &field.value);
                    self.add_attributes(&mut element, &field.attributes, None)?;
                    element
                }
                ChannelFieldKind::Group(group) => {
                    let mut element = Element::new(&group.name);
                    for child in &group.fields {
                        let mut child_element = Element::with_text(&child.name, &child.value);
                        self.add_attributes(&mut child_element, &child.attributes, None)?;
                        element.append(child_element);
                    }
                    self.add_attributes(&mut element, &group.attributes, None)?;
                    element
                }
            };
            parent.append(element);
        }
        Ok(())
    }

    /// Appends one `element_name` element per feed item to `parent`.
    pub fn add_items(&self, parent: &mut Element, element_name: &str) -> Result<()> {
        for item in self.feed.get_items() {
            self.add_item(parent, element_name, &**item)?;
        }
        Ok(())
    }

    pub fn add_item(
        &self,
        parent: &mut Element,
        element_name: &str,
        item: &dyn FeedItem,
    ) -> Result<()> {
        let mut entry = Element::new(element_name);
        for field in &self.fields {
            for element in self.format(field, item)? {
                entry.append(element);
            }
        }
        parent.append(entry);
        Ok(())
    }

    /// Formats one field against `item`, dispatching on its kind.
    pub fn format(&self, field: &ItemFieldKind, item: &dyn FeedItem) -> Result<Vec<Element>> {
        match field {
            ItemFieldKind::Group(group) => self.format_group(group, item),
            ItemFieldKind::Media(media) => self.format_media(media, item),
            ItemFieldKind::Plain(plain) => self.format_item_field(plain, item),
        }
    }

    fn format_group(&self, field: &GroupItemField, item: &dyn FeedItem) -> Result<Vec<Element>> {
        let mut element = Element::new(&field.name);
        self.add_attributes(&mut element, &field.attributes, Some(item))?;

        for child in &field.fields {
            for child_element in self.format(child, item)? {
                element.append(child_element);
            }
        }

        Ok(vec![element])
    }

    fn format_media(&self, field: &MediaItemField, item: &dyn FeedItem) -> Result<Vec<Element>> {
        let Some(values) = item.call(&field.accessor)? else {
            return Ok(Vec::new());
        };

        let mut elements = Vec::new();
        for value in values.into_values() {
            let media = MediaRef::from_value(&value)?;
            let name = field
                .name_for(self.base.name())
                .ok_or_else(|| FeedError::MissingMediaName(self.base.name().to_string()))?;

            let mut element = Element::new(name);
            self.add_attributes(&mut element, &field.attributes, Some(item))?;

            match self.base.enclosure {
                EnclosureStyle::Url => element.set_attribute("url", media.url),
                EnclosureStyle::Link => {
                    element.set_attribute("rel", "enclosure");
                    element.set_attribute("href", media.url);
                }
            }
            element.set_attribute("type", media.media_type);
            element.set_attribute("length", media.length);

            elements.push(element);
        }

        Ok(elements)
    }

    fn format_item_field(&self, field: &ItemField, item: &dyn FeedItem) -> Result<Vec<Element>> {
        let Some(values) = item.call(&field.accessor)? else {
            return Ok(Vec::new());
        };

        values
            .into_values()
            .into_iter()
            .map(|value| self.format_with_options(field, item, value))
            .collect()
    }

    /// Renders one value of a plain field. `translatable` applies first,
    /// then the first of `cdata`, `attribute` and `date_format` that is set.
    fn format_with_options(
        &self,
        field: &ItemField,
        item: &dyn FeedItem,
        value: Value,
    ) -> Result<Element> {
        let name = field.name.as_str();

        let value = if field.get("translatable") {
            Value::Text(self.translate(&scalar_text(&value, name)?))
        } else {
            value
        };

        let mut element = if field.get("cdata") {
            Element::with_cdata(name, scalar_text(&value, name)?)
        } else if field.get("attribute") {
            let attribute_name = field
                .options
                .attribute_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .ok_or(FeedError::MissingAttributeName)?;

            let mut element = Element::new(name);
            element.set_attribute(attribute_name, scalar_text(&value, name)?);
            element
        } else {
            let text = match field.options.date_format.as_deref().filter(|f| !f.is_empty()) {
                Some(layout) => match &value {
                    Value::Date(date) => format_date(date, layout)?,
                    _ => return Err(FeedError::NotADate(name.to_string())),
                },
                None => scalar_text(&value, name)?,
            };
            Element::with_text(name, text)
        };

        self.add_attributes(&mut element, &field.attributes, Some(item))?;
        Ok(element)
    }

    /// Sets `attributes` on `element`. With an item, a key or value naming
    /// one of the item's accessors is replaced by that accessor's result; an
    /// accessor answering nothing leaves the literal in place.
    fn add_attributes(
        &self,
        element: &mut Element,
        attributes: &Attributes,
        item: Option<&dyn FeedItem>,
    ) -> Result<()> {
        for (key, value) in attributes {
            let (key, value) = match item {
                Some(item) => (resolve(item, key)?, resolve(item, value)?),
                None => (key.clone(), value.clone()),
            };
            element.set_attribute(key, value);
        }
        Ok(())
    }
}

fn resolve(item: &dyn FeedItem, literal: &str) -> Result<String> {
    if !item.responds_to(literal) {
        return Ok(literal.to_string());
    }

    match item.call(literal)? {
        Some(value) => scalar_text(&value, literal),
        None => Ok(literal.to_string()),
    }
}

fn scalar_text(value: &Value, field: &str) -> Result<String> {
    value
        .as_text()
        .map(|text| text.into_owned())
        .ok_or_else(|| FeedError::NotScalar(field.to_string()))
}
