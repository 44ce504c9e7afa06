//! Semantic facts and the annotation codec.
//!
//! A [`SemanticFact`] is woven into the document as a small fragment in the
//! annotation namespace, placed where the vendor marker used to be:
//!
//! ```xml
//! <ann:annotation rel="In_Terms_Of">
//!   <ann:ref uri="https://.../concepts/123" referent="https://.../123"
//!            namespace="https://.../clinicalsituations" label="Heart failure"/>
//! </ann:annotation>
//! ```
//!
//! [`AnnotationCodec::decode`] parses such a fragment back, and
//! [`AnnotationCodec::collect`] harvests every fragment of a normalized tree.

use crate::WeaveError;
use crate::concepts::ConceptDescriptor;
use crate::config::WeaverConfig;
use crate::diagnostics::{Diagnostics, codes};
use crate::document::{DocumentTree, NodeId, QName};
use std::fmt;
use std::str::FromStr;

pub(crate) const ANNOTATION: &str = "annotation";
pub(crate) const REF: &str = "ref";
pub(crate) const PROCESS_REFERENCE: &str = "processReference";

// ============================================================================
// FACT TYPES
// ============================================================================

/// The predicate of a semantic fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationType {
    Captures,
    Defines,
    InTermsOf,
    HasPrimarySubject,
    IsAbout,
}

impl RelationType {
    pub const ALL: [RelationType; 5] = [
        RelationType::Captures,
        RelationType::Defines,
        RelationType::InTermsOf,
        RelationType::HasPrimarySubject,
        RelationType::IsAbout,
    ];

    /// Wire tag used in the `rel` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Captures => "Captures",
            RelationType::Defines => "Defines",
            RelationType::InTermsOf => "In_Terms_Of",
            RelationType::HasPrimarySubject => "Has_Primary_Subject",
            RelationType::IsAbout => "Is_About",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| WeaveError::invalid_attribute(format!("unknown relation type '{s}'")))
    }
}

/// The object of a semantic fact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptReference {
    /// URI as written in the source document.
    pub uri: String,
    /// Canonical term, when the concept resolved.
    pub resolved: Option<ConceptDescriptor>,
}

impl ConceptReference {
    pub fn unresolved(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            resolved: None,
        }
    }

    pub fn resolved(uri: impl Into<String>, concept: ConceptDescriptor) -> Self {
        Self {
            uri: uri.into(),
            resolved: Some(concept),
        }
    }
}

/// A typed (predicate, concept) pair attached to a model element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemanticFact {
    pub predicate: Option<RelationType>,
    pub object: ConceptReference,
}

impl SemanticFact {
    pub fn new(predicate: Option<RelationType>, object: ConceptReference) -> Self {
        Self { predicate, object }
    }
}

/// A fact together with the model element that carries it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedFact {
    /// `id` of the owning model element, if it has one.
    pub owner_id: Option<String>,
    /// Local name of the owning model element.
    pub owner_tag: String,
    pub fact: SemanticFact,
}

// ============================================================================
// CODEC
// ============================================================================

/// Converts facts to tree fragments and back.
#[derive(Clone, Copy, Debug)]
pub struct AnnotationCodec<'a> {
    config: &'a WeaverConfig,
}

impl<'a> AnnotationCodec<'a> {
    pub fn new(config: &'a WeaverConfig) -> Self {
        Self { config }
    }

    pub fn namespace(&self) -> &'a str {
        &self.config.annotation_namespace
    }

    /// Make sure the annotation namespace is bound on the root element.
    pub fn declare(&self, doc: &mut DocumentTree) {
        let root = doc.root();
        if doc.prefix_for(root, self.namespace()).is_none() {
            doc.declare_namespace(root, &self.config.annotation_prefix, self.namespace());
        }
    }

    /// Qualified name for an element in the annotation namespace.
    pub(crate) fn qname(&self, doc: &DocumentTree, local: &str) -> QName {
        let prefix = doc
            .prefix_for(doc.root(), self.namespace())
            .unwrap_or(self.config.annotation_prefix.as_str())
            .to_string();
        QName::prefixed(&prefix, local)
    }

    /// Whether `node` is an annotation fragment.
    pub fn is_annotation(&self, doc: &DocumentTree, node: NodeId) -> bool {
        doc.local_name(node) == ANNOTATION && doc.namespace_of(node) == Some(self.namespace())
    }

    /// Build a detached fragment for `fact`.
    pub fn encode(&self, doc: &mut DocumentTree, fact: &SemanticFact) -> NodeId {
        let annotation = doc.create_element(self.qname(doc, ANNOTATION));
        if let Some(rel) = fact.predicate {
            doc.set_attr(annotation, "rel", rel.as_str());
        }

        let reference = doc.append_element(annotation, self.qname(doc, REF));
        doc.set_attr(reference, "uri", fact.object.uri.as_str());
        if let Some(concept) = &fact.object.resolved {
            doc.set_attr(reference, "referent", concept.referent_uri.as_str());
            doc.set_attr(reference, "namespace", concept.namespace_uri.as_str());
            if let Some(label) = &concept.label {
                doc.set_attr(reference, "label", label.as_str());
            }
        }
        annotation
    }

    /// Parse a fragment back into a fact.
    ///
    /// Fragments with more than one object are rejected as unsupported.
    pub fn decode(&self, doc: &DocumentTree, node: NodeId) -> Result<SemanticFact, WeaveError> {
        if !self.is_annotation(doc, node) {
            return Err(WeaveError::invalid_element(format!(
                "<{}> is not an annotation",
                doc.name(node).map(|n| n.to_string()).unwrap_or_default()
            )));
        }

        let predicate = doc
            .attr(node, "rel")
            .map(str::parse::<RelationType>)
            .transpose()?;

        let refs: Vec<NodeId> = doc
            .child_elements(node)
            .filter(|c| doc.local_name(*c) == REF && doc.namespace_of(*c) == Some(self.namespace()))
            .collect();
        let reference = match refs.as_slice() {
            [single] => *single,
            [] => {
                return Err(WeaveError::invalid_element(format!(
                    "annotation at {} has no object",
                    doc.path(node)
                )));
            }
            many => {
                return Err(WeaveError::Unsupported(format!(
                    "annotation at {} has {} objects",
                    doc.path(node),
                    many.len()
                )));
            }
        };

        let uri = doc
            .attr(reference, "uri")
            .ok_or_else(|| WeaveError::invalid_attribute("annotation object without uri"))?;
        let resolved = doc.attr(reference, "namespace").map(|namespace| ConceptDescriptor {
            referent_uri: doc.attr(reference, "referent").unwrap_or(uri).to_string(),
            namespace_uri: namespace.to_string(),
            label: doc.attr(reference, "label").map(str::to_string),
            closure: Vec::new(),
        });

        Ok(SemanticFact {
            predicate,
            object: ConceptReference {
                uri: uri.to_string(),
                resolved,
            },
        })
    }

    /// Decode every annotation in the document, paired with its owner.
    ///
    /// Fragments that fail to decode are skipped and reported.
    pub fn collect(&self, doc: &DocumentTree, diagnostics: &mut Diagnostics) -> Vec<OwnedFact> {
        doc.elements_named(self.namespace(), ANNOTATION)
            .into_iter()
            .filter_map(|node| {
                let fact = match self.decode(doc, node) {
                    Ok(fact) => fact,
                    Err(e) => {
                        diagnostics.warn(codes::MALFORMED_ANNOTATION, e.to_string(), doc.path(node));
                        return None;
                    }
                };
                let owner = owning_element(doc, node);
                Some(OwnedFact {
                    owner_id: owner.and_then(|o| doc.attr(o, "id")).map(str::to_string),
                    owner_tag: owner
                        .map(|o| doc.local_name(o).to_string())
                        .unwrap_or_default(),
                    fact,
                })
            })
            .collect()
    }
}

/// The model element a marker or fragment belongs to: the nearest ancestor
/// that is not an `extensionElements` container.
pub fn owning_element(doc: &DocumentTree, node: NodeId) -> Option<NodeId> {
    doc.ancestors(node)
        .find(|a| doc.local_name(*a) != "extensionElements")
}
