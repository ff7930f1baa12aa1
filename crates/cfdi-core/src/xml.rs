//! Namespace-aware XML tree built on quick-xml.
//!
//! A CFDI document is small enough to hold in memory, so the whole input is
//! read into an [`Element`] tree once. Lookups come in two flavours:
//!
//! - qualified paths such as `cfdi:Complemento/tfd:TimbreFiscalDigital`,
//!   whose prefixes are resolved against a fixed [`NamespaceTable`] instead
//!   of the prefixes the document itself happened to declare;
//! - local-name searches that ignore namespaces entirely.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::XmlError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Immutable prefix to namespace URI mapping used to resolve lookup paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: &'static [(&'static str, &'static str)],
}

impl NamespaceTable {
    /// Build a table from `(prefix, uri)` pairs.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Namespace URI bound to `prefix`, if any.
    pub fn uri(&self, prefix: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, uri)| *uri)
    }
}

/// CFDI 4.0 base namespace.
pub const CFDI_NS: &str = "http://www.sat.gob.mx/cfd/4";
/// Payment complement 2.0 namespace.
pub const PAGOS_NS: &str = "http://www.sat.gob.mx/Pagos20";
/// Fiscal stamp namespace.
pub const TFD_NS: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";
/// Payroll complement 1.2 namespace.
pub const NOMINA_NS: &str = "http://www.sat.gob.mx/nomina12";

/// The four namespaces the extractors know about.
pub const CFDI_NAMESPACES: NamespaceTable = NamespaceTable::new(&[
    ("cfdi", CFDI_NS),
    ("pago20", PAGOS_NS),
    ("tfd", TFD_NS),
    ("nomina12", NOMINA_NS),
]);

/// One element of the parsed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Local name without any prefix.
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI, if the element is bound to one.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, treating an empty or whitespace-only value as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Owned copy of an attribute value.
    pub fn attr_owned(&self, name: &str) -> Option<String> {
        self.attr(name).map(str::to_string)
    }

    /// Attribute value or a fallback when the attribute is missing.
    pub fn attr_or(&self, name: &str, default: &str) -> String {
        self.attr(name).unwrap_or(default).to_string()
    }

    /// Direct children in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// This element followed by all of its descendants, depth-first in
    /// document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All elements in this subtree (self included) with the given local
    /// name, whatever their namespace.
    pub fn find_all_local(&self, local_name: &str) -> Vec<&Element> {
        self.descendants()
            .filter(|e| e.name == local_name)
            .collect()
    }

    fn matches(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.name == local_name && self.namespace.as_deref() == namespace
    }
}

/// Pre-order iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}

/// A parsed XML document together with the namespace table used for
/// qualified lookups.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root: Element,
    namespaces: NamespaceTable,
}

impl XmlDocument {
    /// Parse a document using the CFDI namespace table.
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        Self::parse_with(bytes, CFDI_NAMESPACES)
    }

    /// Parse a document with an explicit namespace table.
    pub fn parse_with(bytes: &[u8], namespaces: NamespaceTable) -> Result<Self, XmlError> {
        let root = parse_tree(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))?;
        Ok(Self { root, namespaces })
    }

    /// Read and parse a file.
    pub fn from_path(path: &Path) -> Result<Self, XmlError> {
        let bytes = std::fs::read(path).map_err(|source| XmlError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes)
    }

    /// The root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The namespace table in use.
    pub fn namespaces(&self) -> NamespaceTable {
        self.namespaces
    }

    /// First element matching a qualified path relative to the root.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_from(&self.root, path)
    }

    /// All elements matching a qualified path relative to the root.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        self.find_all_from(&self.root, path)
    }

    /// First element matching a qualified path relative to `start`.
    pub fn find_from<'a>(&self, start: &'a Element, path: &str) -> Option<&'a Element> {
        self.find_all_from(start, path).into_iter().next()
    }

    /// All elements matching a qualified path relative to `start`, in
    /// document order.
    ///
    /// Each `/`-separated step is `prefix:Local` or a bare `Local` (no
    /// namespace). A step whose prefix is not in the table matches nothing.
    pub fn find_all_from<'a>(&self, start: &'a Element, path: &str) -> Vec<&'a Element> {
        let mut frontier = vec![start];

        for step in path.split('/').filter(|s| !s.is_empty()) {
            let (namespace, local) = match step.split_once(':') {
                Some((prefix, local)) => match self.namespaces.uri(prefix) {
                    Some(uri) => (Some(uri), local),
                    None => return Vec::new(),
                },
                None => (None, step),
            };

            frontier = frontier
                .into_iter()
                .flat_map(|e| e.children.iter())
                .filter(|child| child.matches(namespace, local))
                .collect();

            if frontier.is_empty() {
                break;
            }
        }

        frontier
    }

    /// All elements with the given local name anywhere in the document.
    pub fn find_by_local_name(&self, local_name: &str) -> Vec<&Element> {
        self.root.find_all_local(local_name)
    }
}

/// Strip a Clark-notation `{uri}` prefix from a tag name.
pub fn strip_namespace(tag: &str) -> &str {
    match tag.split_once('}') {
        Some((_, local)) if tag.starts_with('{') => local,
        _ => tag,
    }
}

fn parse_tree(bytes: &[u8]) -> Result<Element, XmlError> {
    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        let (resolved, event) = match reader.read_resolved_event_into(&mut buf) {
            Ok(pair) => pair,
            Err(e) => {
                return Err(XmlError::Malformed {
                    position,
                    reason: e.to_string(),
                });
            }
        };

        match event {
            Event::Start(start) => {
                let element = element_from(resolved, &start, position)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from(resolved, &start, position)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| XmlError::Malformed {
                    position,
                    reason: "closing tag without matching opening tag".to_string(),
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unclosed(open.name.clone()));
    }

    root.ok_or(XmlError::Empty)
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(XmlError::MultipleRoots);
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn element_from(
    resolved: ResolveResult<'_>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<Element, XmlError> {
    let malformed = |reason: String| XmlError::Malformed { position, reason };

    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(malformed(format!(
                "undeclared namespace prefix {}",
                String::from_utf8_lossy(&prefix)
            )));
        }
    };

    let name = std::str::from_utf8(start.local_name().as_ref())
        .map_err(|e| malformed(e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        namespace,
        name,
        attributes,
        children: Vec::new(),
    })
}
