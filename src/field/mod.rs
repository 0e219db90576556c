//! Field descriptors: immutable values describing how to extract one value
//! and render it as XML.
//!
//! Item fields are resolved against every item of the feed; channel fields
//! carry literal values and are rendered once per document.

mod channel;
mod item;

pub use channel::{ChannelField, ChannelFieldKind, GroupChannelField};
pub use item::{
    Attributes, FieldOptions, GroupItemField, ItemField, ItemFieldKind, MediaItemField,
};
