//! RSS document parsing.
//!
//! The raw feed bytes are read with `quick-xml`'s namespace-aware reader into
//! a small owned element tree, then every un-namespaced `<item>` below the
//! root is exposed as a [`RawItem`]. A malformed document never escapes this
//! module: [`parse`] logs it and returns no items.
//!
//! Text follows the usual element-tree convention: an element's text is the
//! character data that precedes its first child element, with entity and
//! character references already resolved.

use crate::error::{Result, SnapshotError};
use crate::utils::truncate_for_log;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::borrow::Cow;
use tracing::{debug, error, info, instrument};

/// Media RSS extension namespace (`media:content`, `media:thumbnail`, ...).
pub const MEDIA_RSS_NS: &str = "http://search.yahoo.com/mrss/";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One node of the parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Resolved namespace URI, `None` for un-namespaced elements.
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.name == name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First un-namespaced direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(None, name))
    }

    /// All elements below `self` in document order, `self` excluded.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            out.push(child);
            child.collect_descendants(out);
        }
    }
}

/// A feed `<item>` as found in the document, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    element: Element,
}

impl RawItem {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// Text of the child element `name` (`title`, `link`, `pubDate`,
    /// `description`), or `None` when the child is missing.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.element.child(name).map(|c| c.text.as_str())
    }

    /// `url` attributes of every `media:content` element inside the item.
    pub fn media_content_urls(&self) -> impl Iterator<Item = &str> {
        self.element
            .descendants()
            .into_iter()
            .filter(|e| e.is(Some(MEDIA_RSS_NS), "content"))
            .filter_map(|e| e.attr("url"))
    }

    /// `url` attribute of the item's first `<enclosure>`.
    pub fn enclosure_url(&self) -> Option<&str> {
        self.element.child("enclosure").and_then(|e| e.attr("url"))
    }
}

/// Parse feed bytes into at most `max_items` items, in document order.
///
/// Malformed input is logged and yields an empty vector.
#[instrument(level = "info", skip_all, fields(bytes = raw.len()))]
pub fn parse(raw: &[u8], max_items: usize) -> Vec<RawItem> {
    let root = match parse_document(raw) {
        Ok(root) => root,
        Err(e) => {
            error!(
                error = %e,
                preview = %truncate_for_log(&String::from_utf8_lossy(raw), 200),
                "Feed XML parse failed"
            );
            return Vec::new();
        }
    };

    let items: Vec<RawItem> = root
        .descendants()
        .into_iter()
        .filter(|e| e.is(None, "item"))
        .take(max_items)
        .cloned()
        .map(RawItem::new)
        .collect();

    info!(count = items.len(), root = %root.name, "Parsed feed items");
    items
}

/// Build the element tree of a complete XML document.
pub fn parse_document(raw: &[u8]) -> Result<Element> {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    let mut reader = NsReader::from_reader(raw);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = match resolved {
            ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
            ResolveResult::Unknown(prefix) => {
                return Err(SnapshotError::MalformedFeed(format!(
                    "unbound namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                )));
            }
            ResolveResult::Unbound => None,
        };

        match event {
            Event::Start(e) => {
                ensure_single_root(&stack, &root)?;
                stack.push(start_element(&e, namespace)?);
            }
            Event::Empty(e) => {
                ensure_single_root(&stack, &root)?;
                let element = start_element(&e, namespace)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    SnapshotError::MalformedFeed("closing tag without an open element".to_string())
                })?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(t) => append_text(&mut stack, &utf8(&t)?)?,
            Event::CData(c) => append_text(&mut stack, &utf8(&c)?)?,
            Event::GeneralRef(r) => {
                let resolved = resolve_reference(&utf8(&r)?)?;
                append_text(&mut stack, resolved.encode_utf8(&mut [0u8; 4]))?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(SnapshotError::MalformedFeed(format!(
            "unclosed element <{}>",
            open.name
        )));
    }
    let root = root.ok_or_else(|| SnapshotError::MalformedFeed("no root element".to_string()))?;
    debug!(root = %root.name, "Parsed XML document");
    Ok(root)
}

fn ensure_single_root(stack: &[Element], root: &Option<Element>) -> Result<()> {
    if stack.is_empty() && root.is_some() {
        return Err(SnapshotError::MalformedFeed(
            "element after the document root".to_string(),
        ));
    }
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        // Character data after a child element is that child's tail; dropped.
        Some(element) if element.children.is_empty() => element.text.push_str(text),
        Some(_) => {}
        None if text.trim().is_empty() => {}
        None => {
            return Err(SnapshotError::MalformedFeed(
                "text outside the document root".to_string(),
            ));
        }
    }
    Ok(())
}

fn start_element(e: &BytesStart<'_>, namespace: Option<String>) -> Result<Element> {
    let name = utf8(e.local_name().as_ref())?.into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = utf8(attr.key.local_name().as_ref())?.into_owned();
        let value = unescape(&utf8(&attr.value)?)?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        namespace,
        name,
        attributes,
        ..Element::default()
    })
}

fn utf8(bytes: &[u8]) -> Result<Cow<'_, str>> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| SnapshotError::MalformedFeed(format!("invalid UTF-8: {e}")))
}

/// Resolve the body of an `&...;` reference: the five predefined XML
/// entities and decimal or hex character references.
fn resolve_reference(name: &str) -> Result<char> {
    let resolved = match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };
    resolved.ok_or_else(|| SnapshotError::UndefinedEntity(name.to_string()))
}

/// Replace references inside attribute values.
fn unescape(raw: &str) -> Result<Cow<'_, str>> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find(';').ok_or_else(|| {
            SnapshotError::MalformedFeed("unterminated reference in attribute".to_string())
        })?;
        out.push(resolve_reference(&after[..end])?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}
