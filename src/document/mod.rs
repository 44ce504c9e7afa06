//! Arena-indexed XML document tree.
//!
//! Every pass of the pipeline mutates one [`DocumentTree`] in place. Nodes live
//! in a flat arena and refer to each other by [`NodeId`], so splicing and
//! deleting subtrees never leaves a dangling reference behind.
//!
//! ## Design
//!
//! ```text
//! DocumentTree
//! ├── nodes: Vec<Node>      (arena, indices never reused)
//! └── root: NodeId
//!
//! Node
//! ├── kind: Element { name, attributes } | Text | CData | Comment
//! ├── parent: Option<NodeId>
//! └── children: Vec<NodeId>  (document order)
//! ```
//!
//! [`DocumentTree::detach`] unlinks a node from its parent in one step. The
//! detached subtree stays in the arena but can no longer be reached from the
//! root, and every traversal here starts from the root.

pub mod namespaces;
mod xml;

use smol_str::SmolStr;
use std::fmt;

pub use namespaces::Dialect;

// ============================================================================
// IDs AND NAMES
// ============================================================================

/// Stable index of a node in a [`DocumentTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A prefixed XML name, e.g. `triso:semanticLink` or `decision`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<SmolStr>,
    pub local: SmolStr,
}

impl QName {
    /// Split a raw `prefix:local` name.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => Self::prefixed(prefix, local),
            None => Self::local(raw),
        }
    }

    /// An unprefixed name.
    pub fn local(local: &str) -> Self {
        Self {
            prefix: None,
            local: SmolStr::new(local),
        }
    }

    /// A prefixed name.
    pub fn prefixed(prefix: &str, local: &str) -> Self {
        Self {
            prefix: Some(SmolStr::new(prefix)),
            local: SmolStr::new(local),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Compare against a raw `prefix:local` string without allocating.
    pub fn matches(&self, raw: &str) -> bool {
        match (raw.split_once(':'), self.prefix()) {
            (Some((p, l)), Some(prefix)) => p == prefix && l == self.local,
            (None, None) => raw == self.local,
            _ => false,
        }
    }

    /// True for `xmlns` and `xmlns:*` declarations.
    pub fn is_namespace_declaration(&self) -> bool {
        match self.prefix() {
            Some(p) => p == "xmlns",
            None => self.local == "xmlns",
        }
    }

    /// The prefix bound by a namespace declaration. `Some(None)` is the
    /// default namespace; `None` means this is not a declaration.
    pub fn declared_prefix(&self) -> Option<Option<&str>> {
        match self.prefix() {
            Some("xmlns") => Some(Some(self.local.as_str())),
            None if self.local == "xmlns" => Some(None),
            _ => None,
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An attribute on an element. Attribute order is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Payload of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        name: QName,
        attributes: Vec<Attribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// ============================================================================
// DOCUMENT TREE
// ============================================================================

/// A mutable, namespace-aware XML document.
#[derive(Clone, Debug)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
}

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

impl DocumentTree {
    /// Create a document with a single, empty root element.
    pub fn new(root: QName) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    name: root,
                    attributes: Vec::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// Parse a document from XML bytes.
    pub fn parse(input: &[u8]) -> Result<Self, crate::WeaveError> {
        xml::read(input)
    }

    /// Parse a document from an XML string.
    pub fn parse_str(input: &str) -> Result<Self, crate::WeaveError> {
        xml::read(input.as_bytes())
    }

    /// Serialize the reachable tree to indented UTF-8 XML.
    pub fn to_xml(&self) -> Result<Vec<u8>, crate::WeaveError> {
        xml::write(self)
    }

    /// Serialize to a `String`.
    pub fn to_xml_string(&self) -> Result<String, crate::WeaveError> {
        let bytes = self.to_xml()?;
        String::from_utf8(bytes).map_err(|e| crate::WeaveError::xml(format!("Invalid UTF-8: {e}")))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    /// Element name, or `None` for character data.
    pub fn name(&self, id: NodeId) -> Option<&QName> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Local element name (empty for non-elements).
    pub fn local_name(&self, id: NodeId) -> &str {
        self.name(id).map(|n| n.local.as_str()).unwrap_or("")
    }

    // ── Attributes ──────────────────────────────────────────────────

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.kind(id) {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Mutable access to the attribute list of an element.
    pub fn attributes_mut(&mut self, id: NodeId) -> Option<&mut Vec<Attribute>> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Attribute value by raw name (`id`, `xsi:type`, ...).
    pub fn attr(&self, id: NodeId, raw_name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name.matches(raw_name))
            .map(|a| a.value.as_str())
    }

    /// Attribute value by namespace URI and local name, whatever prefix is used.
    pub fn attr_ns(&self, id: NodeId, namespace: &str, local: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| {
                a.name.local == local && self.attr_namespace(id, &a.name) == Some(namespace)
            })
            .map(|a| a.value.as_str())
    }

    /// Set (or replace) an attribute by raw name.
    pub fn set_attr(&mut self, id: NodeId, raw_name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attributes) = self.attributes_mut(id) {
            match attributes.iter_mut().find(|a| a.name.matches(raw_name)) {
                Some(existing) => existing.value = value,
                None => attributes.push(Attribute::new(QName::parse(raw_name), value)),
            }
        }
    }

    /// Remove an attribute by raw name, returning its value.
    pub fn remove_attr(&mut self, id: NodeId, raw_name: &str) -> Option<String> {
        let attributes = self.attributes_mut(id)?;
        let pos = attributes.iter().position(|a| a.name.matches(raw_name))?;
        Some(attributes.remove(pos).value)
    }

    // ── Navigation ──────────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Child nodes that are elements.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    /// First child element with the given local name.
    pub fn find_child(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.child_elements(id).find(|c| self.local_name(*c) == local)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Element descendants of `id` in document order, excluding `id`.
    ///
    /// Returns a snapshot, so callers may mutate the tree while iterating.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_elements(id).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let start = stack.len();
            stack.extend(self.child_elements(next));
            stack[start..].reverse();
        }
        out
    }

    /// Every reachable element, root first, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = vec![self.root];
        out.extend(self.descendants(self.root));
        out
    }

    /// Whether the node can still be reached from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).last() == Some(self.root)
    }

    /// Human-readable location used in diagnostics, e.g.
    /// `/definitions/decision[@id='_1']/extensionElements`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments: Vec<String> = self
            .ancestors(id)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .chain(std::iter::once(id))
            .map(|n| match self.attr(n, "id") {
                Some(xml_id) => format!("{}[@id='{}']", self.local_name(n), xml_id),
                None => self.local_name(n).to_string(),
            })
            .collect();
        segments.insert(0, String::new());
        segments.join("/")
    }

    // ── Mutation ────────────────────────────────────────────────────

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate an element that is not yet attached anywhere.
    pub fn create_element(&mut self, name: QName) -> NodeId {
        self.alloc(NodeKind::Element {
            name,
            attributes: Vec::new(),
        })
    }

    /// Append a detached node as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Insert a node at a given child position of `parent`.
    pub fn attach_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Insert `child` immediately before `anchor` under the anchor's parent.
    pub fn insert_before(&mut self, anchor: NodeId, child: NodeId) {
        let Some(parent) = self.parent(anchor) else {
            return;
        };
        self.detach(child);
        let pos = self.nodes[parent.index()]
            .children
            .iter()
            .position(|c| *c == anchor)
            .unwrap_or(0);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.insert(pos, child);
    }

    /// Create and append a new element under `parent`.
    pub fn append_element(&mut self, parent: NodeId, name: QName) -> NodeId {
        let id = self.create_element(name);
        self.attach(parent, id);
        id
    }

    pub(crate) fn append_raw(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        self.attach(parent, id);
        id
    }

    /// Unlink a node (and its subtree) from its parent. The root cannot be
    /// detached; detaching an already detached node is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    // ── Namespaces ──────────────────────────────────────────────────

    /// Resolve a prefix (or the default namespace for `None`) in the scope of `id`.
    pub fn resolve_prefix(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            Some("xml") => return Some(XML_NAMESPACE),
            Some("xmlns") => return Some(XMLNS_NAMESPACE),
            _ => {}
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|n| {
                self.attributes(n)
                    .iter()
                    .find(|a| a.name.declared_prefix() == Some(prefix))
                    .map(|a| a.value.as_str())
            })
            .filter(|uri| !uri.is_empty())
    }

    /// Namespace URI of an element.
    pub fn namespace_of(&self, id: NodeId) -> Option<&str> {
        let name = self.name(id)?;
        self.resolve_prefix(id, name.prefix())
    }

    /// Namespace URI of an attribute on `id`. Unprefixed attributes have none.
    pub fn attr_namespace(&self, id: NodeId, attr: &QName) -> Option<&str> {
        if attr.is_namespace_declaration() {
            return Some(XMLNS_NAMESPACE);
        }
        attr.prefix().and_then(|p| self.resolve_prefix(id, Some(p)))
    }

    /// Bind `prefix` to `uri` on element `id`.
    pub fn declare_namespace(&mut self, id: NodeId, prefix: &str, uri: &str) {
        self.set_attr(id, &format!("xmlns:{prefix}"), uri);
    }

    /// A prefix bound to `uri` in the scope of `id`, if any.
    pub fn prefix_for(&self, id: NodeId, uri: &str) -> Option<&str> {
        std::iter::once(id).chain(self.ancestors(id)).find_map(|n| {
            self.attributes(n).iter().find_map(|a| match a.name.declared_prefix() {
                Some(Some(p)) if a.value == uri => Some(p),
                _ => None,
            })
        })
    }

    /// Every element whose namespace is `namespace` and local name is `local`.
    pub fn elements_named(&self, namespace: &str, local: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|n| self.local_name(*n) == local && self.namespace_of(*n) == Some(namespace))
            .collect()
    }

    /// Every element in the given namespace.
    pub fn elements_in(&self, namespace: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|n| self.namespace_of(*n) == Some(namespace))
            .collect()
    }

    /// Every reachable element with the given local name, any namespace.
    pub fn elements_local(&self, local: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|n| self.local_name(*n) == local)
            .collect()
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a DocumentTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
