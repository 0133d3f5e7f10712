//! Generic XML node tree
//!
//! CDA documents arrive with arbitrary namespace prefixes and nesting, so
//! the extractor works over a small tagged-union tree instead of a typed
//! schema: an element owns its name (namespace prefix stripped), its
//! attributes, and an always-a-list of children. Malformed input degrades
//! to whatever tree was accumulated before the parse error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Depth cap for recursive tree walks
pub const MAX_TREE_DEPTH: usize = 20;

/// A node in the parsed XML tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// A text node (trimmed, entity-unescaped)
    Text(String),
    /// An element with namespace-stripped name
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<XmlNode>,
    },
}

impl XmlNode {
    /// Element name, if this is an element
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element { name, .. } => Some(name),
            Self::Text(_) => None,
        }
    }

    /// Whether this is an element with the given name
    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    /// Child nodes (empty for text nodes)
    pub fn children(&self) -> &[XmlNode] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }

    /// Attribute value by (namespace-stripped) name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            Self::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            Self::Text(_) => None,
        }
    }

    /// First child element with the given name
    pub fn first_child(&self, name: &str) -> Option<&XmlNode> {
        self.children().iter().find(|c| c.is_named(name))
    }

    /// All child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children().iter().filter(move |c| c.is_named(name))
    }

    /// Direct text content of this node, joined with single spaces
    pub fn direct_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Element { children, .. } => {
                let parts: Vec<&str> = children
                    .iter()
                    .filter_map(|c| match c {
                        Self::Text(value) => Some(value.as_str()),
                        _ => None,
                    })
                    .collect();
                parts.join(" ")
            }
        }
    }

    /// Flatten this node to text: all descendant text content joined with
    /// single spaces, attributes skipped. Recursion below `max_depth`
    /// levels is truncated, not an error.
    pub fn flatten_text(&self, max_depth: usize) -> String {
        let mut parts = Vec::new();
        self.flatten_into(&mut parts, max_depth);
        parts.join(" ")
    }

    fn flatten_into(&self, parts: &mut Vec<String>, depth: usize) {
        match self {
            Self::Text(value) => parts.push(value.clone()),
            Self::Element { children, .. } => {
                if depth == 0 {
                    return;
                }
                for child in children {
                    child.flatten_into(parts, depth - 1);
                }
            }
        }
    }

    fn collect_lines(&self, lines: &mut Vec<String>, depth: usize) {
        match self {
            Self::Text(value) => lines.push(value.clone()),
            Self::Element { children, .. } => {
                if depth == 0 {
                    return;
                }
                for child in children {
                    child.collect_lines(lines, depth - 1);
                }
            }
        }
    }
}

/// Concatenate every text leaf under the given nodes, one per line
///
/// This is the generic scrape used when the expected CDA shape is absent:
/// it guarantees some output for any tree with at least one text node.
pub fn tree_text(nodes: &[XmlNode], max_depth: usize) -> String {
    let mut lines = Vec::new();

    for node in nodes {
        node.collect_lines(&mut lines, max_depth);
    }

    lines.join("\n")
}

/// Parse an XML string into a list of top-level nodes
///
/// Namespace prefixes are stripped from element and attribute names, so
/// `sdtc:raceCode` and `raceCode` compare equal. A parse error ends the
/// walk and returns the partial tree instead of failing.
pub fn parse_tree(xml: &str) -> Vec<XmlNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<(String, Vec<(String, String)>, Vec<XmlNode>)> = Vec::new();
    let mut roots: Vec<XmlNode> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                stack.push((local_name(&start), collect_attributes(&start), Vec::new()));
            }
            Ok(Event::Empty(start)) => {
                let node = XmlNode::Element {
                    name: local_name(&start),
                    attributes: collect_attributes(&start),
                    children: Vec::new(),
                };
                attach(&mut stack, &mut roots, node);
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(text.as_ref()).into_owned());
                let trimmed = value.trim();

                if !trimmed.is_empty() {
                    attach(&mut stack, &mut roots, XmlNode::Text(trimmed.to_string()));
                }
            }
            Ok(Event::CData(data)) => {
                let value = String::from_utf8_lossy(data.as_ref());
                let trimmed = value.trim();

                if !trimmed.is_empty() {
                    attach(&mut stack, &mut roots, XmlNode::Text(trimmed.to_string()));
                }
            }
            Ok(Event::End(_)) => {
                if let Some((name, attributes, children)) = stack.pop() {
                    attach(
                        &mut stack,
                        &mut roots,
                        XmlNode::Element {
                            name,
                            attributes,
                            children,
                        },
                    );
                }
            }
            Ok(Event::Eof) => break,
            // Malformed input: keep whatever parsed so far
            Err(_) => break,
            Ok(_) => {}
        }
    }

    // Close any elements left open by truncated input
    while let Some((name, attributes, children)) = stack.pop() {
        attach(
            &mut stack,
            &mut roots,
            XmlNode::Element {
                name,
                attributes,
                children,
            },
        );
    }

    roots
}

fn attach(
    stack: &mut [(String, Vec<(String, String)>, Vec<XmlNode>)],
    roots: &mut Vec<XmlNode>,
    node: XmlNode,
) {
    match stack.last_mut() {
        Some((_, _, children)) => children.push(node),
        None => roots.push(node),
    }
}

fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn collect_attributes(start: &BytesStart) -> Vec<(String, String)> {
    start
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect()
}
