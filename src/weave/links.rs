//! Link Resolver: reuse and copy placeholders.
//!
//! A reused element is a local placeholder for content defined in another
//! model. CMMN expresses that natively through `externalRef`, so the
//! placeholder is left alone. DMN has no such attribute: every reference to
//! the placeholder is repointed at the source URI and the placeholder is
//! deleted.

use crate::annotation::owning_element;
use crate::diagnostics::{Diagnostics, codes};
use crate::document::{Dialect, DocumentTree, NodeId};
use crate::weave::markers::{LinkMarker, Markers};

/// Attributes that point at a diagram-only copy of an element.
const DIAGRAM_REFERENCES: [&str; 2] = ["dmnElementRef", "cmmnElementRef"];

/// What happened to one marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The dialect references reused content natively.
    Native,
    /// The placeholder was deleted after repointing `references` attributes.
    Resolved {
        placeholder: Option<String>,
        references: usize,
        shapes: usize,
    },
    /// Nothing could be done; the marker is left for the redactor.
    Skipped,
}

/// Counts for one resolver run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub resolved: usize,
    pub repointed: usize,
    pub shapes_removed: usize,
    pub skipped: usize,
}

pub struct LinkResolver<'a> {
    markers: Markers<'a>,
    dialect: Dialect,
}

impl<'a> LinkResolver<'a> {
    pub fn new(markers: Markers<'a>, dialect: Dialect) -> Self {
        Self { markers, dialect }
    }

    /// Resolve every non-accelerator reuse and copy marker.
    pub fn resolve_all(&self, doc: &mut DocumentTree, diagnostics: &mut Diagnostics) -> LinkStats {
        let mut stats = LinkStats::default();
        if self.dialect.has_native_external_reference() {
            return stats;
        }

        let mut pending = self.markers.all(doc, LinkMarker::ReuseLink);
        pending.extend(self.markers.all(doc, LinkMarker::CopyLink));

        for marker in pending {
            // An earlier placeholder may have taken this one with it.
            if !doc.is_attached(marker) || self.markers.is_accelerator(doc, marker) {
                continue;
            }
            match self.resolve(doc, marker, diagnostics) {
                LinkOutcome::Resolved {
                    references, shapes, ..
                } => {
                    stats.resolved += 1;
                    stats.repointed += references;
                    stats.shapes_removed += shapes;
                }
                LinkOutcome::Skipped => stats.skipped += 1,
                LinkOutcome::Native => {}
            }
        }
        stats
    }

    /// Resolve one marker.
    pub fn resolve(
        &self,
        doc: &mut DocumentTree,
        marker: NodeId,
        diagnostics: &mut Diagnostics,
    ) -> LinkOutcome {
        if self.dialect.has_native_external_reference() {
            return LinkOutcome::Native;
        }

        let Some(placeholder) = owning_element(doc, marker).filter(|p| *p != doc.root()) else {
            return LinkOutcome::Skipped;
        };
        let Some(target) = doc.attr(marker, "uri").map(str::to_string) else {
            diagnostics.warn(
                codes::MISSING_LINK_TARGET,
                "reuse link without a target uri",
                doc.path(marker),
            );
            return LinkOutcome::Skipped;
        };

        let id = doc.attr(placeholder, "id").map(str::to_string);
        let references = id.as_deref().map_or(0, |id| self.repoint(doc, id, &target));
        let shapes = self.remove_shapes(doc, placeholder);

        tracing::trace!(
            placeholder = id.as_deref().unwrap_or(""),
            target = %target,
            references,
            "resolved reuse placeholder"
        );
        doc.detach(placeholder);
        LinkOutcome::Resolved {
            placeholder: id,
            references,
            shapes,
        }
    }

    /// Point every `href="#id"` at `target`.
    fn repoint(&self, doc: &mut DocumentTree, id: &str, target: &str) -> usize {
        let local = format!("#{id}");
        let referencing: Vec<NodeId> = doc
            .elements()
            .into_iter()
            .filter(|n| doc.attr(*n, "href") == Some(local.as_str()))
            .collect();
        for node in &referencing {
            doc.set_attr(*node, "href", target);
        }
        referencing.len()
    }

    /// Delete diagram shapes and edges drawn for the placeholder or for
    /// anything inside it, such as its requirements.
    fn remove_shapes(&self, doc: &mut DocumentTree, placeholder: NodeId) -> usize {
        let ids: Vec<String> = std::iter::once(placeholder)
            .chain(doc.descendants(placeholder))
            .filter_map(|n| doc.attr(n, "id").map(str::to_string))
            .collect();
        if ids.is_empty() {
            return 0;
        }
        let shapes: Vec<NodeId> = doc
            .elements()
            .into_iter()
            .filter(|n| {
                DIAGRAM_REFERENCES.iter().any(|attr| {
                    doc.attr(*n, attr)
                        .is_some_and(|v| ids.iter().any(|id| references_id(v, id)))
                })
            })
            .collect();
        for shape in &shapes {
            doc.detach(*shape);
        }
        shapes.len()
    }
}

/// Whether a (possibly prefixed) element reference names `id`.
pub(crate) fn references_id(value: &str, id: &str) -> bool {
    value == id || value.rsplit_once(':').is_some_and(|(_, local)| local == id)
}
