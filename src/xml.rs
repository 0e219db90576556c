//! A small in-memory XML tree.
//!
//! Formatters build the whole document first and serialise it in one pass,
//! so a failing field leaves no partial output behind.
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Cursor;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use crate::error::{FeedError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An element holding `text` as its content. Empty text yields an empty
    /// element.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        let text = text.into();
        if !text.is_empty() {
            element.children.push(Node::Text(text));
        }
        element
    }

    pub fn with_cdata(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(Node::CData(text.into()));
        element
    }

    /// Sets `key`, replacing an existing attribute of the same name in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn append(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    fn write(&self, writer: &mut Writer<Cursor<Vec<u8>>>, charset: Charset) -> Result<()> {
        charset.check_name(&self.name)?;

        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            charset.check_name(key)?;
            let value = charset.encode(&escape(value.as_str())).into_owned();
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: Cow::Owned(value.into_bytes()),
            });
        }

        if self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer, charset)?,
                Node::Text(text) => {
                    let escaped = charset.encode(&partial_escape(text.as_str())).into_owned();
                    write_event(writer, Event::Text(BytesText::from_escaped(escaped)))?;
                }
                Node::CData(text) => write_cdata(writer, text, charset)?,
            }
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Xml(e.to_string()))
}

/// Writes `text` as CDATA. In an ASCII-only charset, runs of other
/// characters go between sections as character references.
fn write_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, text: &str, charset: Charset) -> Result<()> {
    let runs = match charset {
        Charset::Utf8 => vec![(true, text)],
        Charset::Ascii => ascii_runs(text),
    };

    for (ascii, run) in runs {
        if ascii {
            for section in cdata_sections(run) {
                write_event(writer, Event::CData(BytesCData::new(section.as_ref())))?;
            }
        } else {
            let refs = charset.encode(run).into_owned();
            write_event(writer, Event::Text(BytesText::from_escaped(refs)))?;
        }
    }
    Ok(())
}

/// Splits text so no section contains the `]]>` terminator. Concatenating
/// the sections gives back the original text.
fn cdata_sections(text: &str) -> Vec<Cow<'_, str>> {
    if !text.contains("]]>") {
        return vec![Cow::Borrowed(text)];
    }

    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 {
                section.push('>');
            }
            section.push_str(part);
            if i < last {
                section.push_str("]]");
            }
            Cow::Owned(section)
        })
        .collect()
}

/// Splits `text` into alternating ASCII and non-ASCII runs. Empty text is
/// one empty ASCII run.
fn ascii_runs(text: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let ascii = c.is_ascii();
        match current {
            Some(kind) if kind != ascii => {
                runs.push((kind, &text[start..i]));
                start = i;
                current = Some(ascii);
            }
            None => current = Some(ascii),
            _ => {}
        }
    }
    runs.push((current.unwrap_or(true), &text[start..]));
    runs
}

/// What the document body may contain as raw characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    Utf8,
    /// Any other ASCII-compatible encoding (`iso-8859-1`, `windows-1252`,
    /// ...). Characters outside ASCII are written as `&#x..;`.
    Ascii,
}

impl Charset {
    fn for_encoding(encoding: &str) -> Result<Self> {
        let unsupported = || FeedError::UnsupportedEncoding(encoding.to_string());

        // EncName ::= [A-Za-z] ([A-Za-z0-9._] | '-')*
        let mut chars = encoding.chars();
        let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !well_formed {
            return Err(unsupported());
        }

        let lower = encoding.to_ascii_lowercase();
        match lower.as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            // not ASCII-compatible
            e if e.starts_with("utf-16") || e.starts_with("utf-32") || e.starts_with("ucs") => {
                Err(unsupported())
            }
            _ => Ok(Charset::Ascii),
        }
    }

    /// `text` with every character the charset cannot hold replaced by a
    /// character reference. `text` must already be escaped.
    fn encode<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if *self == Charset::Utf8 || text.is_ascii() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len() + 8);
        for c in text.chars() {
            if c.is_ascii() {
                out.push(c);
            } else {
                // writing to a String cannot fail
                let _ = write!(out, "&#x{:X};", u32::from(c));
            }
        }
        Cow::Owned(out)
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if !is_xml_name(name) {
            return Err(FeedError::InvalidName(name.to_string()));
        }
        if *self == Charset::Ascii && !name.is_ascii() {
            return Err(FeedError::UnencodableName(name.to_string()));
        }
        Ok(())
    }
}

/// Whether `name` matches the XML 1.0 `Name` production.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// A complete XML document: declaration plus a single root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    encoding: String,
    root: Element,
}

impl Document {
    pub fn new(encoding: impl Into<String>, root: Element) -> Self {
        Self {
            encoding: encoding.into(),
            root,
        }
    }

    /// Serialises the tree with two-space indentation. Text and CDATA stay on
    /// the line of their element.
    ///
    /// For an encoding other than UTF-8 the body is kept to ASCII, which
    /// every supported encoding reads the same way. Element and attribute
    /// names are checked against the XML `Name` production.
    pub fn to_xml(&self) -> Result<String> {
        let charset = Charset::for_encoding(&self.encoding)?;
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some(self.encoding.as_str()), None)),
        )?;
        self.root.write(&mut writer, charset)?;

        let mut xml = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| FeedError::Xml(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialises_nested_tree_with_indentation() {
        let mut root = Element::new("rss");
        root.set_attribute("version", "2.0");
        let mut channel = Element::new("channel");
        channel.append(Element::with_cdata("title", "Fake title"));
        channel.append(Element::with_text("link", "http://x/y?a=1&b=2"));
        let mut enclosure = Element::new("enclosure");
        enclosure.set_attribute("url", "http://x/a.jpg");
        channel.append(enclosure);
        root.append(channel);

        let xml = Document::new("utf-8", root).to_xml().unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <rss version=\"2.0\">\n  \
               <channel>\n    \
                 <title><![CDATA[Fake title]]></title>\n    \
                 <link>http://x/y?a=1&amp;b=2</link>\n    \
                 <enclosure url=\"http://x/a.jpg\"/>\n  \
               </channel>\n\
             </rss>\n"
        );
    }

    #[test]
    fn test_set_attribute_replaces_existing() {
        let mut element = Element::new("link");
        element.set_attribute("href", "a");
        element.set_attribute("rel", "self");
        element.set_attribute("href", "b");
        assert_eq!(
            element.attributes,
            vec![
                ("href".to_string(), "b".to_string()),
                ("rel".to_string(), "self".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_text_gives_empty_element() {
        let xml = Document::new("utf-8", Element::with_text("summary", ""))
            .to_xml()
            .unwrap();
        assert!(xml.contains("<summary/>"));
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        let sections = cdata_sections("a]]>b]]>c");
        assert_eq!(sections, vec!["a]]", ">b]]", ">c"]);
        assert_eq!(sections.concat(), "a]]>b]]>c");

        let xml = Document::new("utf-8", Element::with_cdata("d", "x]]>y"))
            .to_xml()
            .unwrap();
        assert!(xml.contains("<d><![CDATA[x]]]]><![CDATA[>y]]></d>"));
    }

    #[test]
    fn test_xml_names() {
        for name in ["title", "media:content", "_x", "dc.creator", "a-1", "caf\u{e9}"] {
            assert!(is_xml_name(name), "{name}");
        }
        for name in ["", "1title", "-x", "fake custom", "a<b", "a=\"b\"", "x/y"] {
            assert!(!is_xml_name(name), "{name}");
        }
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let err = Document::new("utf-8", Element::with_text("fake custom", "x"))
            .to_xml()
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidName(ref n) if n == "fake custom"));

        let mut root = Element::new("item");
        root.set_attribute("bad key", "x");
        let err = Document::new("utf-8", root).to_xml().unwrap_err();
        assert!(matches!(err, FeedError::InvalidName(ref n) if n == "bad key"));
    }

    #[test]
    fn test_latin1_body_uses_character_references() {
        let mut root = Element::new("channel");
        root.set_attribute("label", "Caf\u{e9} & co");
        root.append(Element::with_text("title", "Caf\u{e9}"));
        root.append(Element::with_cdata("description", "<b>Caf\u{e9}</b>"));

        let xml = Document::new("iso-8859-1", root).to_xml().unwrap();
        assert!(xml.is_ascii());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>"));
        assert!(xml.contains("label=\"Caf&#xE9; &amp; co\""));
        assert!(xml.contains("<title>Caf&#xE9;</title>"));
        assert!(xml.contains(
            "<description><![CDATA[<b>Caf]]>&#xE9;<![CDATA[</b>]]></description>"
        ));
    }

    #[test]
    fn test_utf8_body_is_written_raw() {
        let xml = Document::new("UTF-8", Element::with_text("title", "Caf\u{e9}"))
            .to_xml()
            .unwrap();
        assert!(xml.contains("<title>Caf\u{e9}</title>"));
    }

    #[test]
    fn test_unsupported_encodings_are_rejected() {
        for encoding in ["utf-16", "UTF-32LE", "ucs-2", "", "8bit", "iso 8859-1"] {
            let err = Document::new(encoding, Element::new("rss"))
                .to_xml()
                .unwrap_err();
            assert!(
                matches!(err, FeedError::UnsupportedEncoding(ref e) if e == encoding),
                "{encoding}"
            );
        }
    }

    #[test]
    fn test_non_ascii_name_needs_utf8() {
        let err = Document::new("iso-8859-1", Element::new("caf\u{e9}"))
            .to_xml()
            .unwrap_err();
        assert!(matches!(err, FeedError::UnencodableName(_)));

        assert!(Document::new("utf-8", Element::new("caf\u{e9}"))
            .to_xml()
            .is_ok());
    }

    #[test]
    fn test_ascii_runs() {
        assert_eq!(ascii_runs(""), vec![(true, "")]);
        assert_eq!(
            ascii_runs("a\u{e9}\u{e8}b"),
            vec![(true, "a"), (false, "\u{e9}\u{e8}"), (true, "b")]
        );
    }
}
