//! Non-model cross references (weaving step 5).
//!
//! A custom attribute keyed `xref:<kind>` records that the enclosing task
//! depends on some external artifact. It becomes a process reference in the
//! task's extension elements:
//!
//! ```xml
//! <ann:processReference rel="Depends_On" href="https://.../artifacts/p1"/>
//! ```
//!
//! A CMMN `processTask` without a `processRef` is also bound to a synthetic
//! external `process` definition.

use super::{ensure_extension_elements, external_reference, insert_definition, model_name, synthetic_id};
use crate::annotation::{AnnotationCodec, PROCESS_REFERENCE};
use crate::config::{UriKind, WeaverConfig};
use crate::diagnostics::{Diagnostics, codes};
use crate::document::{Dialect, DocumentTree, NodeId};
use crate::weave::markers::{LinkMarker, Markers};
use std::fmt;

/// Elements a cross reference can attach to.
const TASK_LIKE: [&str; 8] = [
    "task",
    "humanTask",
    "processTask",
    "caseTask",
    "decisionTask",
    "decision",
    "businessKnowledgeModel",
    "decisionService",
];

const PROCESS_SIBLINGS: [&str; 2] = ["case", "process"];

/// Relationship between a task and an external artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    DependsOn,
    DerivedFrom,
    Effectuates,
    Imports,
    Includes,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 5] = [
        ReferenceKind::DependsOn,
        ReferenceKind::DerivedFrom,
        ReferenceKind::Effectuates,
        ReferenceKind::Imports,
        ReferenceKind::Includes,
    ];

    /// Key suffix after the cross-reference prefix.
    pub fn key(self) -> &'static str {
        match self {
            ReferenceKind::DependsOn => "dependsOn",
            ReferenceKind::DerivedFrom => "derivedFrom",
            ReferenceKind::Effectuates => "effectuates",
            ReferenceKind::Imports => "imports",
            ReferenceKind::Includes => "includes",
        }
    }

    /// Tag written to the `rel` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::DependsOn => "Depends_On",
            ReferenceKind::DerivedFrom => "Derived_From",
            ReferenceKind::Effectuates => "Effectuates",
            ReferenceKind::Imports => "Imports",
            ReferenceKind::Includes => "Includes",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts cross references from custom attributes.
pub struct CrossReferences<'a> {
    config: &'a WeaverConfig,
    markers: Markers<'a>,
    dialect: Dialect,
}

impl<'a> CrossReferences<'a> {
    pub fn new(config: &'a WeaverConfig, dialect: Dialect) -> Self {
        Self {
            config,
            markers: Markers::new(&config.vendor),
            dialect,
        }
    }

    /// Rewrite every cross-reference attribute; returns how many were consumed.
    pub fn extract(&self, doc: &mut DocumentTree, diagnostics: &mut Diagnostics) -> usize {
        let prefix = self.config.vendor.cross_reference_prefix.as_str();
        let mut consumed = 0;

        for node in self.markers.all(doc, LinkMarker::CustomAttribute) {
            let Some(key) = doc.attr(node, "key").and_then(|k| k.strip_prefix(prefix)) else {
                continue;
            };
            let Some(kind) = ReferenceKind::from_key(key) else {
                diagnostics.warn(
                    codes::UNKNOWN_REFERENCE_KIND,
                    format!("unknown cross-reference kind '{key}'"),
                    doc.path(node),
                );
                continue;
            };
            let Some(target) = doc.attr(node, "value").map(str::to_string) else {
                diagnostics.warn(
                    codes::MISSING_LINK_TARGET,
                    format!("{kind} reference without a value"),
                    doc.path(node),
                );
                continue;
            };
            let Some(task) = doc
                .ancestors(node)
                .find(|a| TASK_LIKE.contains(&doc.local_name(*a)))
            else {
                diagnostics.warn(
                    codes::ORPHAN_REFERENCE,
                    format!("{kind} reference outside any task"),
                    doc.path(node),
                );
                continue;
            };

            self.attach(doc, task, kind, &target);
            doc.detach(node);
            consumed += 1;
        }

        tracing::debug!(consumed, "extracted cross references");
        consumed
    }

    fn attach(&self, doc: &mut DocumentTree, task: NodeId, kind: ReferenceKind, target: &str) {
        let codec = AnnotationCodec::new(self.config);
        let href = self
            .config
            .rewrite_uri(target, UriKind::Artifact)
            .unwrap_or_else(|| target.to_string());

        let extensions = ensure_extension_elements(doc, task);
        let duplicate = doc.child_elements(extensions).any(|c| {
            doc.local_name(c) == PROCESS_REFERENCE
                && doc.attr(c, "rel") == Some(kind.as_str())
                && doc.attr(c, "href") == Some(href.as_str())
        });
        if !duplicate {
            let reference = doc.append_element(extensions, codec.qname(doc, PROCESS_REFERENCE));
            doc.set_attr(reference, "rel", kind.as_str());
            doc.set_attr(reference, "href", href);
        }

        if self.dialect.is_cmmn()
            && doc.local_name(task) == "processTask"
            && doc.attr(task, "processRef").is_none()
        {
            self.bind_process(doc, task, target);
        }
    }

    fn bind_process(&self, doc: &mut DocumentTree, task: NodeId, target: &str) {
        let id = synthetic_id(target);
        let root = doc.root();
        let exists = doc
            .child_elements(root)
            .any(|c| doc.attr(c, "id") == Some(id.as_str()));
        if !exists {
            let external = external_reference(doc, self.config, target);
            let process = doc.create_element(model_name(doc, "process"));
            doc.set_attr(process, "id", id.as_str());
            if let Some(name) = doc.attr(task, "name").map(str::to_string) {
                doc.set_attr(process, "name", name);
            }
            doc.set_attr(process, "externalRef", external);
            insert_definition(doc, process, &PROCESS_SIBLINGS);
        }
        doc.set_attr(task, "processRef", id);
    }
}
