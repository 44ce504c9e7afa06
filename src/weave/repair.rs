//! Structural Repair for CMMN.
//!
//! Every `decisionTask` must reference a decision. Vendor exports of reused
//! decisions omit `decisionRef` and only keep a copy or reuse marker; the
//! reference is rebuilt from that marker:
//!
//! ```xml
//! <decisionTask decisionRef="_6b1c...">...</decisionTask>
//! <decision id="_6b1c..." name="Eligibility" externalRef="ns1001:_abc"/>
//! ```

use super::{external_reference, insert_definition, model_name, synthetic_id};
use crate::config::WeaverConfig;
use crate::diagnostics::{Diagnostics, codes};
use crate::document::{DocumentTree, NodeId};
use crate::weave::markers::{LinkMarker, Markers};

const DECISION_TASK: &str = "decisionTask";
const DECISION_REF: &str = "decisionRef";

/// Root children a synthesized decision is placed after.
const DECISION_SIBLINGS: [&str; 3] = ["case", "process", "decision"];

pub struct StructuralRepair<'a> {
    config: &'a WeaverConfig,
    markers: Markers<'a>,
}

impl<'a> StructuralRepair<'a> {
    pub fn new(config: &'a WeaverConfig) -> Self {
        Self {
            config,
            markers: Markers::new(&config.vendor),
        }
    }

    /// Repair every decision task without a `decisionRef`; returns how many
    /// were repaired.
    pub fn repair(&self, doc: &mut DocumentTree, diagnostics: &mut Diagnostics) -> usize {
        let tasks: Vec<NodeId> = doc
            .elements_local(DECISION_TASK)
            .into_iter()
            .filter(|t| doc.attr(*t, DECISION_REF).is_none())
            .collect();

        let repaired = tasks
            .into_iter()
            .filter(|task| self.repair_task(doc, *task, diagnostics))
            .count();
        tracing::debug!(repaired, "repaired decision tasks");
        repaired
    }

    fn repair_task(&self, doc: &mut DocumentTree, task: NodeId, diagnostics: &mut Diagnostics) -> bool {
        let marker = self
            .markers
            .attached(doc, task, LinkMarker::CopyLink)
            .or_else(|| self.markers.attached(doc, task, LinkMarker::ReuseLink));
        let Some(uri) = marker.and_then(|m| doc.attr(m, "uri")).map(str::to_string) else {
            diagnostics.warn(
                codes::MISSING_REPAIR_SOURCE,
                "decision task has no decisionRef and no copy or reuse link",
                doc.path(task),
            );
            return false;
        };

        let id = synthetic_id(&uri);
        doc.set_attr(task, DECISION_REF, id.as_str());

        let root = doc.root();
        let exists = doc
            .child_elements(root)
            .any(|c| doc.attr(c, "id") == Some(id.as_str()));
        if !exists {
            let external = external_reference(doc, self.config, &uri);
            let name = doc
                .attr(task, "name")
                .map(str::to_string)
                .unwrap_or_else(|| external.rsplit(':').next().unwrap_or_default().to_string());

            let decision = doc.create_element(model_name(doc, "decision"));
            doc.set_attr(decision, "id", id.as_str());
            doc.set_attr(decision, "name", name);
            doc.set_attr(decision, "externalRef", external);
            insert_definition(doc, decision, &DECISION_SIBLINGS);
        }

        tracing::trace!(task = %doc.path(task), %uri, "restored decision reference");
        true
    }
}
