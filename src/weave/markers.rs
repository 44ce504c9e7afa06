//! Vendor link markers and their dispositions.
//!
//! Markers are elements in the vendor metadata namespace, usually nested in
//! the `extensionElements` of the model element they describe:
//!
//! ```xml
//! <semantic:decision id="_d1">
//!   <semantic:extensionElements>
//!     <triso:reuseLink uri="http://www.trisotech.com/definitions/_m2#_d9"/>
//!   </semantic:extensionElements>
//! </semantic:decision>
//! ```

use crate::config::VendorProfile;
use crate::document::{DocumentTree, NodeId};

/// Kinds of vendor markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkMarker {
    SemanticLink,
    ReuseLink,
    CopyLink,
    Relationship,
    Attachment,
    Comment,
    CustomAttribute,
}

/// What happens to a marker over the whole pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Woven into standard constructs, then deleted.
    RewriteThenRemove,
    /// Not relevant; deleted by the redactor.
    RemoveOnly,
    /// Kept as a standard extension fragment by the weaver.
    Encapsulate,
}

impl LinkMarker {
    pub const ALL: [LinkMarker; 7] = [
        LinkMarker::SemanticLink,
        LinkMarker::ReuseLink,
        LinkMarker::CopyLink,
        LinkMarker::Relationship,
        LinkMarker::Attachment,
        LinkMarker::Comment,
        LinkMarker::CustomAttribute,
    ];

    pub fn local_name(self) -> &'static str {
        match self {
            LinkMarker::SemanticLink => "semanticLink",
            LinkMarker::ReuseLink => "reuseLink",
            LinkMarker::CopyLink => "copyOfLink",
            LinkMarker::Relationship => "relationship",
            LinkMarker::Attachment => "attachment",
            LinkMarker::Comment => "comment",
            LinkMarker::CustomAttribute => "customAttribute",
        }
    }

    pub fn from_local(local: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.local_name() == local)
    }

    pub fn disposition(self) -> Disposition {
        match self {
            LinkMarker::SemanticLink => Disposition::Encapsulate,
            LinkMarker::ReuseLink | LinkMarker::CopyLink | LinkMarker::CustomAttribute => {
                Disposition::RewriteThenRemove
            }
            LinkMarker::Relationship | LinkMarker::Attachment | LinkMarker::Comment => {
                Disposition::RemoveOnly
            }
        }
    }
}

/// Marker lookups against one vendor profile.
#[derive(Clone, Copy, Debug)]
pub struct Markers<'a> {
    vendor: &'a VendorProfile,
}

impl<'a> Markers<'a> {
    pub fn new(vendor: &'a VendorProfile) -> Self {
        Self { vendor }
    }

    /// Every reachable marker of `kind`, in document order.
    pub fn all(&self, doc: &DocumentTree, kind: LinkMarker) -> Vec<NodeId> {
        doc.elements_named(&self.vendor.metadata_namespace, kind.local_name())
    }

    /// The marker kind of `node`, if it is one.
    pub fn kind_of(&self, doc: &DocumentTree, node: NodeId) -> Option<LinkMarker> {
        if doc.namespace_of(node) != Some(self.vendor.metadata_namespace.as_str()) {
            return None;
        }
        LinkMarker::from_local(doc.local_name(node))
    }

    /// Whether a reuse or semantic link is classified as accelerator reuse.
    pub fn is_accelerator(&self, doc: &DocumentTree, node: NodeId) -> bool {
        self.vendor
            .accelerator_classifier
            .iter()
            .all(|(attr, value)| doc.attr(node, attr) == Some(value.as_str()))
    }

    /// The first marker of `kind` attached to `owner`, either as a direct
    /// child or inside its `extensionElements`.
    pub fn attached(&self, doc: &DocumentTree, owner: NodeId, kind: LinkMarker) -> Option<NodeId> {
        let direct = doc.child_elements(owner);
        let nested = doc
            .child_elements(owner)
            .filter(|c| doc.local_name(*c) == "extensionElements")
            .flat_map(|ext| doc.child_elements(ext));
        direct
            .chain(nested)
            .find(|c| self.kind_of(doc, *c) == Some(kind))
    }

    /// Whether `node` or any of its ancestors carries a marker of one of `kinds`.
    pub fn within_marked(&self, doc: &DocumentTree, node: NodeId, kinds: &[LinkMarker]) -> bool {
        std::iter::once(node)
            .chain(doc.ancestors(node))
            .filter(|n| doc.local_name(*n) != "extensionElements")
            .any(|n| kinds.iter().any(|k| self.attached(doc, n, *k).is_some()))
    }
}
