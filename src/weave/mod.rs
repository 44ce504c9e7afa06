//! The Weaver: rewrites vendor constructs into standard ones.
//!
//! [`Weaver::weave`] runs a fixed sequence of steps over one document, in
//! place:
//!
//! 1. detect the dialect, set the schema location, bind output namespaces
//! 2. turn semantic links (and accelerator reuse links) into annotations
//! 3. resolve reuse and copy placeholders ([`links`])
//! 4. extract the governing [`Identifier`]
//! 5. turn cross-reference custom attributes into process references ([`xrefs`])
//! 6. rewrite namespace-bearing attributes ([`namespaces`])
//! 7. rewrite cross-model `href`s on data-flow elements
//! 8. restore missing decision references in CMMN ([`repair`])
//! 9. hand over to the [`BindingRewriter`]
//!
//! Every step tolerates zero matches. Data-quality problems are collected in
//! the returned [`WeaveReport`]; only configuration problems fail the call.
//! Weaving a woven document changes nothing.

pub mod links;
pub mod markers;
pub mod namespaces;
pub mod repair;
pub mod xrefs;

use crate::WeaveError;
use crate::annotation::AnnotationCodec;
use crate::concepts::ConceptResolver;
use crate::config::{UriKind, WeaverConfig};
use crate::diagnostics::{Diagnostics, codes};
use crate::document::{Dialect, DocumentTree, NodeId, QName};
use crate::identifier::{self, Identifier};
use crate::inference::{Inference, RelationshipInference};
use links::{LinkResolver, LinkStats};
use markers::{LinkMarker, Markers};
use repair::StructuralRepair;
use uuid::Uuid;
use xrefs::CrossReferences;

// ============================================================================
// BINDINGS
// ============================================================================

/// Final, delegated weaving step that rewrites I/O data bindings.
pub trait BindingRewriter: Send + Sync {
    fn rewrite(
        &self,
        doc: &mut DocumentTree,
        dialect: Dialect,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), WeaveError>;
}

/// Leaves bindings untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBindings;

impl BindingRewriter for NoBindings {
    fn rewrite(&self, _: &mut DocumentTree, _: Dialect, _: &mut Diagnostics) -> Result<(), WeaveError> {
        Ok(())
    }
}

// ============================================================================
// WEAVER
// ============================================================================

/// What one weaving run did.
#[derive(Clone, Debug)]
pub struct WeaveReport {
    pub dialect: Dialect,
    pub identifier: Option<Identifier>,
    /// Annotation fragments written.
    pub facts: usize,
    pub links: LinkStats,
    pub cross_references: usize,
    pub repaired: usize,
    pub diagnostics: Diagnostics,
}

pub struct Weaver<'a> {
    config: &'a WeaverConfig,
    resolver: &'a dyn ConceptResolver,
    bindings: &'a dyn BindingRewriter,
}

impl<'a> Weaver<'a> {
    pub fn new(config: &'a WeaverConfig, resolver: &'a dyn ConceptResolver) -> Self {
        Self {
            config,
            resolver,
            bindings: &NoBindings,
        }
    }

    pub fn with_bindings(mut self, bindings: &'a dyn BindingRewriter) -> Self {
        self.bindings = bindings;
        self
    }

    /// Weave `doc` in place.
    pub fn weave(&self, doc: &mut DocumentTree) -> Result<WeaveReport, WeaveError> {
        let mut diagnostics = Diagnostics::new();
        let markers = Markers::new(&self.config.vendor);

        let dialect = namespaces::prepare(doc, self.config)?;
        let facts = self.weave_annotations(doc, markers, &mut diagnostics);
        let links = LinkResolver::new(markers, dialect).resolve_all(doc, &mut diagnostics);
        let identifier = identifier::extract(doc, self.config)?;
        let cross_references = CrossReferences::new(self.config, dialect).extract(doc, &mut diagnostics);
        namespaces::rewrite_namespaces(doc, self.config);
        namespaces::rewrite_references(doc, self.config);
        let repaired = if dialect.is_cmmn() {
            StructuralRepair::new(self.config).repair(doc, &mut diagnostics)
        } else {
            0
        };
        self.bindings.rewrite(doc, dialect, &mut diagnostics)?;

        tracing::debug!(
            ?dialect,
            facts,
            resolved_links = links.resolved,
            cross_references,
            repaired,
            warnings = diagnostics.len(),
            "woven document"
        );
        Ok(WeaveReport {
            dialect,
            identifier,
            facts,
            links,
            cross_references,
            repaired,
            diagnostics,
        })
    }

    /// Step 2: replace semantic links and accelerator reuse links with
    /// annotation fragments.
    fn weave_annotations(
        &self,
        doc: &mut DocumentTree,
        markers: Markers<'_>,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let inference = RelationshipInference::new(self.config, self.resolver);
        let codec = AnnotationCodec::new(self.config);

        let mut pending = markers.all(doc, LinkMarker::SemanticLink);
        for kind in [LinkMarker::ReuseLink, LinkMarker::CopyLink] {
            pending.extend(
                markers
                    .all(doc, kind)
                    .into_iter()
                    .filter(|m| markers.is_accelerator(doc, *m)),
            );
        }

        let mut woven = 0;
        for marker in pending {
            match inference.infer(doc, marker) {
                Inference::Fact(fact) => {
                    let fragment = codec.encode(doc, &fact);
                    doc.insert_before(marker, fragment);
                    doc.detach(marker);
                    woven += 1;
                }
                Inference::Implied => {
                    tracing::trace!(path = %doc.path(marker), "knowledge asset type, no fact");
                    doc.detach(marker);
                }
                Inference::Unclassified { context, concept } => {
                    diagnostics.warn(
                        codes::UNCLASSIFIED_CONTEXT,
                        format!(
                            "no relationship for {} annotated on <{context}>",
                            concept.referent_uri
                        ),
                        doc.path(marker),
                    );
                    doc.detach(marker);
                }
                Inference::Unresolved { uri } => diagnostics.warn(
                    codes::UNRESOLVED_CONCEPT,
                    format!("concept {uri} did not resolve"),
                    doc.path(marker),
                ),
                Inference::MissingUri => diagnostics.warn(
                    codes::MISSING_CONCEPT_URI,
                    "semantic link without uri",
                    doc.path(marker),
                ),
            }
        }
        woven
    }
}

// ============================================================================
// SHARED TREE HELPERS
// ============================================================================

/// Stable id for a synthesized definition: `_` + name-based UUID of `uri`.
pub fn synthetic_id(uri: &str) -> String {
    format!("_{}", Uuid::new_v5(&Uuid::NAMESPACE_URL, uri.as_bytes()))
}

/// Name for a new model element, using the root element's prefix.
pub(crate) fn model_name(doc: &DocumentTree, local: &str) -> QName {
    match doc.name(doc.root()).and_then(|n| n.prefix()) {
        Some(prefix) => QName::prefixed(prefix, local),
        None => QName::local(local),
    }
}

/// The `extensionElements` child of `owner`, created after any leading
/// documentation when missing.
pub(crate) fn ensure_extension_elements(doc: &mut DocumentTree, owner: NodeId) -> NodeId {
    if let Some(existing) = doc.find_child(owner, "extensionElements") {
        return existing;
    }
    let position = doc
        .children(owner)
        .iter()
        .position(|c| {
            doc.is_element(*c) && !matches!(doc.local_name(*c), "documentation" | "description")
        })
        .unwrap_or(doc.children(owner).len());
    let extensions = doc.create_element(model_name(doc, "extensionElements"));
    doc.attach_at(owner, position, extensions);
    extensions
}

/// Bind the model part of `uri` to a fresh `nsNNNN` prefix on the root (or
/// reuse an existing binding) and return `prefix:fragment`.
pub(crate) fn external_reference(doc: &mut DocumentTree, config: &WeaverConfig, uri: &str) -> String {
    let (model, fragment) = uri
        .split_once('#')
        .or_else(|| uri.rsplit_once('/'))
        .unwrap_or((uri, ""));
    let model = config
        .rewrite_uri(model, UriKind::Artifact)
        .unwrap_or_else(|| model.to_string());

    let root = doc.root();
    let prefix = match doc.prefix_for(root, &model) {
        Some(prefix) => prefix.to_string(),
        None => {
            let prefix = unused_prefix(doc);
            doc.declare_namespace(root, &prefix, &model);
            prefix
        }
    };
    format!("{prefix}:{fragment}")
}

fn unused_prefix(doc: &DocumentTree) -> String {
    let mut n = 1001;
    loop {
        let candidate = format!("ns{n}");
        if doc.resolve_prefix(doc.root(), Some(&candidate)).is_none() {
            return candidate;
        }
        n += 1;
    }
}

/// Insert a new root-level definition after the last root child named in
/// `after`, or before any trailing relationship/artifact/diagram content.
pub(crate) fn insert_definition(doc: &mut DocumentTree, definition: NodeId, after: &[&str]) {
    let root = doc.root();
    let children = doc.children(root);
    let position = children
        .iter()
        .rposition(|c| after.contains(&doc.local_name(*c)))
        .map(|i| i + 1)
        .or_else(|| {
            children.iter().position(|c| {
                matches!(
                    doc.local_name(*c),
                    "relationship" | "artifact" | "textAnnotation" | "association" | "CMMNDI" | "DMNDI"
                )
            })
        })
        .unwrap_or(children.len());
    doc.attach_at(root, position, definition);
}
