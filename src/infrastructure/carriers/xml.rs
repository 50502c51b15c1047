//! # XML Helpers
//!
//! Shared XML plumbing for the Canada Post and Purolator transports.
//!
//! Typed payloads go through `quick_xml`'s serde support. Responses are first
//! passed through [`strip_namespaces`] so wire structs can name elements by
//! local name regardless of the prefixes a carrier chooses. SOAP envelopes,
//! whose element names carry fixed prefixes, are assembled with
//! [`XmlElement`] on top of the event writer.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;

/// XML declaration prepended to serialized request bodies.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Errors raised while reading or writing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Malformed markup.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Writer I/O failure.
    #[error("xml write error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed attribute.
    #[error("xml attribute error: {0}")]
    Attr(#[from] AttrError),

    /// Name or text that is not UTF-8.
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Writer output that is not UTF-8.
    #[error("invalid utf-8: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),

    /// Document does not match the expected shape.
    #[error("xml mapping error: {0}")]
    De(#[from] quick_xml::DeError),
}

/// Rewrites a document with every namespace prefix removed.
///
/// `xmlns` declarations are dropped, prefixed element and attribute names
/// are reduced to their local names, and whitespace-only text is trimmed.
/// The XML declaration and comments are not carried over.
///
/// # Errors
///
/// Returns [`XmlError`] for malformed input.
pub fn strip_namespaces(xml: &str) -> Result<String, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    loop {
        match reader.read_event()? {
            Event::Start(e) => writer.write_event(Event::Start(local_start(&e)?))?,
            Event::Empty(e) => writer.write_event(Event::Empty(local_start(&e)?))?,
            Event::End(e) => {
                let name = std::str::from_utf8(e.local_name().as_ref())?.to_owned();
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
            other => writer.write_event(other)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn local_start(e: &BytesStart<'_>) -> Result<BytesStart<'static>, XmlError> {
    let name = std::str::from_utf8(e.local_name().as_ref())?.to_owned();
    let mut out = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        out.push_attribute((attr.key.local_name().as_ref(), attr.value.as_ref()));
    }
    Ok(out)
}

/// Decodes a namespaced document into `T` after stripping prefixes.
///
/// # Errors
///
/// Returns [`XmlError`] for malformed input or a shape mismatch.
pub fn from_xml<T: DeserializeOwned>(xml: &str) -> Result<T, XmlError> {
    let plain = strip_namespaces(xml)?;
    Ok(quick_xml::de::from_str(&plain)?)
}

/// Serializes `value` as a standalone document with an XML declaration.
///
/// # Errors
///
/// Returns [`XmlError::De`] when the value cannot be represented as XML.
pub fn to_xml<T: Serialize>(value: &T) -> Result<String, XmlError> {
    let body = quick_xml::se::to_string(value)?;
    Ok(format!("{XML_DECLARATION}{body}"))
}

/// Parses a decimal amount, treating blanks and garbage as zero.
#[must_use]
pub fn parse_amount(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or(Decimal::ZERO)
}

/// A small element tree for documents with fixed namespace prefixes.
///
/// Text and attribute values are escaped on write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Sets the text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child element holding only text.
    #[must_use]
    pub fn leaf(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.child(XmlElement::new(name).text(text))
    }

    /// Element name, prefix included.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes this element and its subtree.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] when the writer fails.
    pub fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    /// Renders the element as a document with an XML declaration.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] when the writer fails.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.write(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }
}
