//! Simple in-memory tree implementing `XdmNode`, used in tests, benches and
//! quick prototypes of a host evaluator.
//!
//! ```
//! use xpath_extensions::simple_node::{attr, doc, elem, text};
//! use xpath_extensions::XdmNode;
//!
//! // <catalog><book><author gender="male">Mike</author></book></catalog>
//! let document = doc()
//!     .child(
//!         elem("catalog").child(
//!             elem("book").child(elem("author").attr(attr("gender", "male")).child(text("Mike"))),
//!         ),
//!     )
//!     .build();
//!
//! let catalog = document.children()[0].clone();
//! assert_eq!(catalog.name().unwrap().local, "catalog");
//! assert_eq!(catalog.string_value(), "Mike");
//! ```
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, Weak};

use crate::model::{NodeKind, QName, XdmNode};

#[derive(Debug)]
pub(crate) struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>,
    base_uri: Option<String>,
    parent: RwLock<Option<Weak<Inner>>>,
    attributes: RwLock<Vec<SimpleNode>>,
    children: RwLock<Vec<SimpleNode>>,
    cached_text: OnceLock<String>, // element/document string value
}

/// Arc-backed node; equality is identity.
#[derive(Clone)]
pub struct SimpleNode(pub(crate) Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl SimpleNode {
    fn new(kind: NodeKind, name: Option<QName>, value: Option<String>) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            value,
            base_uri: None,
            parent: RwLock::new(None),
            attributes: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
            cached_text: OnceLock::new(),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None)
    }
    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(QName::local(name)))
    }
    pub fn attribute(name: &str, value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Attribute, Some(QName::local(name)), Some(value.to_string()))
    }
    pub fn text(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Text, None, Some(value.to_string()))
    }
    pub fn comment(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Comment, None, Some(value.to_string()))
    }

    /// Child elements with the given local name.
    pub fn child_elements(&self, local: &str) -> Vec<SimpleNode> {
        self.children()
            .into_iter()
            .filter(|c| c.kind() == NodeKind::Element && c.name().is_some_and(|q| q.local == local))
            .collect()
    }

    /// Attribute node by local name.
    pub fn attribute_node(&self, local: &str) -> Option<SimpleNode> {
        self.attributes().into_iter().find(|a| a.name().is_some_and(|q| q.local == local))
    }
}

pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: Option<QName>,
    base_uri: Option<String>,
    pending_children: Vec<SimpleNode>,
    pending_attrs: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>) -> Self {
        Self { kind, name, base_uri: None, pending_children: Vec::new(), pending_attrs: Vec::new() }
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.pending_children.push(child.into().into_node());
        self
    }

    #[must_use]
    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.pending_attrs.push(attr);
        self
    }

    #[must_use]
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    pub fn build(self) -> SimpleNode {
        let node = SimpleNode(Arc::new(Inner {
            kind: self.kind,
            name: self.name,
            value: None,
            base_uri: self.base_uri,
            parent: RwLock::new(None),
            attributes: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
            cached_text: OnceLock::new(),
        }));
        for n in self.pending_attrs.iter().chain(self.pending_children.iter()) {
            if let Ok(mut parent) = n.0.parent.write() {
                *parent = Some(Arc::downgrade(&node.0));
            }
        }
        if let Ok(mut attrs) = node.0.attributes.write() {
            *attrs = self.pending_attrs;
        }
        if let Ok(mut children) = node.0.children.write() {
            *children = self.pending_children;
        }
        node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl SimpleNodeOrBuilder {
    fn into_node(self) -> SimpleNode {
        match self {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        }
    }
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}
impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

// Convenience helpers for concise test code
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}
pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}
pub fn attr(name: &str, v: &str) -> SimpleNode {
    SimpleNode::attribute(name, v)
}
pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

impl XdmNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }
    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }
    fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Text | NodeKind::Attribute | NodeKind::Comment => {
                self.0.value.clone().unwrap_or_default()
            }
            NodeKind::Element | NodeKind::Document => self
                .0
                .cached_text
                .get_or_init(|| {
                    let mut out = String::new();
                    fn dfs(n: &SimpleNode, out: &mut String) {
                        if n.kind() == NodeKind::Text
                            && let Some(v) = &n.0.value
                        {
                            out.push_str(v);
                        }
                        for c in n.children() {
                            dfs(&c, out);
                        }
                    }
                    dfs(self, &mut out);
                    out
                })
                .clone(),
        }
    }
    fn base_uri(&self) -> Option<String> {
        self.0.base_uri.clone().or_else(|| self.parent().and_then(|p| p.base_uri()))
    }
    fn parent(&self) -> Option<Self> {
        self.0.parent.read().ok()?.as_ref().and_then(Weak::upgrade).map(SimpleNode)
    }
    fn children(&self) -> Vec<Self> {
        self.0.children.read().map(|v| v.clone()).unwrap_or_default()
    }
    fn attributes(&self) -> Vec<Self> {
        self.0.attributes.read().map(|v| v.clone()).unwrap_or_default()
    }
}
