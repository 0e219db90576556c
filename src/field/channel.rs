use super::item::{collect_attributes, Attributes};

/// A literal name/value pair rendered under the channel (RSS) or feed root
/// (Atom). Attributes are used as given.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelField {
    pub name: String,
    pub value: String,
    pub attributes: Attributes,
}

impl ChannelField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
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

#[derive(Debug, Clone, PartialEq)]
pub struct GroupChannelField {
    pub name: String,
    pub fields: Vec<ChannelField>,
    pub attributes: Attributes,
}

impl GroupChannelField {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = ChannelField>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().collect(),
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

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelFieldKind {
    Simple(ChannelField),
    Group(GroupChannelField),
}

impl From<ChannelField> for ChannelFieldKind {
    fn from(field: ChannelField) -> Self {
        ChannelFieldKind::Simple(field)
    }
}

impl From<GroupChannelField> for ChannelFieldKind {
    fn from(field: GroupChannelField) -> Self {
        ChannelFieldKind::Group(field)
    }
}
