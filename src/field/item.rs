use std::collections::BTreeMap;

use serde::Deserialize;

/// Ordered XML attributes attached to a field.
///
/// On item fields each key and value is first looked up as an accessor name
/// on the item being rendered; the literal string is used when the item has
/// no such accessor.
pub type Attributes = Vec<(String, String)>;

pub(crate) fn collect_attributes<I, K, V>(attributes: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    attributes
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Rendering options for a plain item field.
///
/// Applied in this order: `translatable` first, then the first of `cdata`,
/// `attribute` or `date_format` that is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub cdata: bool,
    pub attribute: bool,
    pub attribute_name: Option<String>,
    /// A chrono `strftime` layout.
    pub date_format: Option<String>,
    pub translatable: bool,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cdata(mut self) -> Self {
        self.cdata = true;
        self
    }

    /// Renders the value as the single attribute `name` of an empty element.
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = true;
        self.attribute_name = Some(name.into());
        self
    }

    pub fn date_format(mut self, layout: impl Into<String>) -> Self {
        self.date_format = Some(layout.into());
        self
    }

    pub fn translatable(mut self) -> Self {
        self.translatable = true;
        self
    }

    /// Whether `option` is enabled. Unknown options and unset string options
    /// read as `false`.
    pub fn get(&self, option: &str) -> bool {
        match option {
            "cdata" => self.cdata,
            "attribute" => self.attribute,
            "translatable" => self.translatable,
            "attribute_name" => self.attribute_name.as_deref().is_some_and(|n| !n.is_empty()),
            "date_format" => self.date_format.as_deref().is_some_and(|f| !f.is_empty()),
            _ => false,
        }
    }
}

/// One value pulled from the item through `accessor` and rendered as
/// element `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemField {
    pub name: String,
    pub accessor: String,
    pub options: FieldOptions,
    pub attributes: Attributes,
}

impl ItemField {
    pub fn new(name: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accessor: accessor.into(),
            options: FieldOptions::default(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes = collect_attributes(attributes);
        self
    }

    pub fn get(&self, option: &str) -> bool {
        self.options.get(option)
    }
}

/// A media enclosure. Its element name depends on the output format, so it
/// carries a format → name mapping instead of a single name.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItemField {
    pub names: BTreeMap<String, String>,
    pub accessor: String,
    pub attributes: Attributes,
}

impl MediaItemField {
    pub fn new(accessor: impl Into<String>) -> Self {
        let names = [("rss", "enclosure"), ("atom", "link")]
            .into_iter()
            .map(|(format, name)| (format.to_string(), name.to_string()))
            .collect();

        Self {
            names,
            accessor: accessor.into(),
            attributes: Attributes::new(),
        }
    }

    /// Overrides (or adds) the element name used for `format`.
    pub fn with_name(mut self, format: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(format.into(), name.into());
        self
    }

    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes = collect_attributes(attributes);
        self
    }

    pub fn name_for(&self, format: &str) -> Option<&str> {
        self.names.get(format).map(String::as_str)
    }
}

/// A container element wrapping other item fields, rendered once per item.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupItemField {
    pub name: String,
    pub fields: Vec<ItemFieldKind>,
    pub attributes: Attributes,
}

impl GroupItemField {
    pub fn new<I, F>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<ItemFieldKind>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes = collect_attributes(attributes);
        self
    }
}

/// Every kind of item field a formatter knows how to render.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemFieldKind {
    Plain(ItemField),
    Media(MediaItemField),
    Group(GroupItemField),
}

impl From<ItemField> for ItemFieldKind {
    fn from(field: ItemField) -> Self {
        ItemFieldKind::Plain(field)
    }
}

impl From<MediaItemField> for ItemFieldKind {
    fn from(field: MediaItemField) -> Self {
        ItemFieldKind::Media(field)
    }
}

impl From<GroupItemField> for ItemFieldKind {
    fn from(field: GroupItemField) -> Self {
        ItemFieldKind::Group(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_lookup_defaults_to_false() {
        let options = FieldOptions::new().cdata();
        assert!(options.get("cdata"));
        assert!(!options.get("attribute"));
        assert!(!options.get("date_format"));
        assert!(!options.get("no_such_option"));

        let options = FieldOptions::new().attribute("href");
        assert!(options.get("attribute"));
        assert!(options.get("attribute_name"));
    }

    #[test]
    fn test_options_from_toml() {
        let options: FieldOptions =
            toml::from_str("cdata = true\ndate_format = \"%Y\"").unwrap();
        assert!(options.cdata);
        assert_eq!(options.date_format.as_deref(), Some("%Y"));
        assert!(!options.translatable);
    }

    #[test]
    fn test_media_names_per_format() {
        let field = MediaItemField::new("feed_media_item");
        assert_eq!(field.name_for("rss"), Some("enclosure"));
        assert_eq!(field.name_for("atom"), Some("link"));
        assert_eq!(field.name_for("json"), None);

        let field = field.with_name("rss", "media");
        assert_eq!(field.name_for("rss"), Some("media"));
    }

    #[test]
    fn test_group_accepts_single_or_many() {
        let single = GroupItemField::new("categories", [ItemField::new("category", "categories")]);
        assert_eq!(single.fields.len(), 1);

        let many = GroupItemField::new(
            "links",
            vec![
                ItemFieldKind::from(GroupItemField::new("link", [ItemField::new("a", "a")])),
                ItemFieldKind::from(MediaItemField::new("media")),
            ],
        );
        assert_eq!(many.fields.len(), 2);
        assert!(matches!(many.fields[0], ItemFieldKind::Group(_)));
    }
}
