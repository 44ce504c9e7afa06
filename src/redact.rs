//! The Redactor: deletes every vendor-proprietary construct left after weaving.
//!
//! Runs strictly after the weaver. It never encapsulates anything; it only
//! deletes, plus repairs a couple of known-malformed vendor values. The passes
//! run in this order:
//!
//! - dynamic decision services generated by the vendor tool, with their shapes
//! - `caseFileItemDefinition/@definitionType` repair
//! - imports of vendor-only model types
//! - leftover link markers (unresolved semantic links are reported)
//! - any element in a vendor namespace
//! - attributes in, or pointing at, a vendor namespace

use crate::config::WeaverConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, codes};
use crate::document::{DocumentTree, NodeId};
use crate::weave::links::references_id;
use crate::weave::markers::{Disposition, LinkMarker, Markers};

/// Definition type for items with no usable type.
pub const DEFINITION_TYPE_UNSPECIFIED: &str = "http://www.omg.org/spec/CMMN/DefinitionType/Unspecified";
/// Definition type for items typed by an XSD element.
pub const DEFINITION_TYPE_XSD: &str = "http://www.omg.org/spec/CMMN/DefinitionType/XSDElement";

const ITEM_DEFINITION_TYPE: &str = "ItemDefinitionType";

/// Vendor elements that are not link markers but are deleted the same way.
const VENDOR_TAGS: [&str; 2] = ["tags", "tag"];

/// Counts for one redaction run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedactStats {
    pub decision_services: usize,
    pub definition_types: usize,
    pub imports: usize,
    pub markers: usize,
    pub elements: usize,
    pub attributes: usize,
}

pub struct Redactor<'a> {
    config: &'a WeaverConfig,
}

impl<'a> Redactor<'a> {
    pub fn new(config: &'a WeaverConfig) -> Self {
        Self { config }
    }

    /// Redact `doc` in place.
    pub fn redact(&self, doc: &mut DocumentTree, diagnostics: &mut Diagnostics) -> RedactStats {
        let stats = RedactStats {
            decision_services: self.remove_dynamic_decision_services(doc),
            definition_types: self.repair_definition_types(doc, diagnostics),
            imports: self.remove_unsupported_imports(doc),
            markers: self.remove_markers(doc, diagnostics),
            elements: self.remove_vendor_elements(doc),
            attributes: self.strip_attributes(doc),
        };
        tracing::debug!(?stats, "redacted document");
        stats
    }

    fn remove_dynamic_decision_services(&self, doc: &mut DocumentTree) -> usize {
        let vendor = &self.config.vendor;
        let services: Vec<NodeId> = doc
            .elements_local("decisionService")
            .into_iter()
            .filter(|s| {
                doc.attr_ns(*s, &vendor.metadata_namespace, &vendor.dynamic_decision_service_attribute)
                    == Some("true")
            })
            .collect();

        for service in &services {
            if let Some(id) = doc.attr(*service, "id").map(str::to_string) {
                let shapes: Vec<NodeId> = doc
                    .elements()
                    .into_iter()
                    .filter(|n| {
                        ["dmnElementRef", "cmmnElementRef"]
                            .iter()
                            .any(|a| doc.attr(*n, a).is_some_and(|v| references_id(v, &id)))
                    })
                    .collect();
                for shape in shapes {
                    doc.detach(shape);
                }
            }
            doc.detach(*service);
        }
        services.len()
    }

    fn repair_definition_types(&self, doc: &mut DocumentTree, diagnostics: &mut Diagnostics) -> usize {
        let token = self.config.vendor.domain_token.as_str();
        let mut repaired = 0;

        for item in doc.elements_local("caseFileItemDefinition") {
            let current = doc.attr(item, "definitionType");
            let replacement = match current {
                None | Some("") | Some("null") => DEFINITION_TYPE_UNSPECIFIED,
                Some(value) if !token.is_empty() && value.contains(token) => {
                    if value.contains(ITEM_DEFINITION_TYPE) {
                        DEFINITION_TYPE_XSD
                    } else {
                        diagnostics.push(
                            Diagnostic::warning(
                                codes::REPAIRED_DEFINITION_TYPE,
                                format!("vendor definition type {value} replaced by Unspecified"),
                            )
                            .at(doc.path(item)),
                        );
                        DEFINITION_TYPE_UNSPECIFIED
                    }
                }
                Some(_) => continue,
            };
            doc.set_attr(item, "definitionType", replacement);
            repaired += 1;
        }
        repaired
    }

    fn remove_unsupported_imports(&self, doc: &mut DocumentTree) -> usize {
        let token = self.config.vendor.unsupported_import_token.as_str();
        let imports: Vec<NodeId> = doc
            .elements_local("import")
            .into_iter()
            .filter(|i| doc.attr(*i, "importType").is_some_and(|t| t.contains(token)))
            .collect();
        for import in &imports {
            doc.detach(*import);
        }
        imports.len()
    }

    fn remove_markers(&self, doc: &mut DocumentTree, diagnostics: &mut Diagnostics) -> usize {
        let markers = Markers::new(&self.config.vendor);
        let mut removed = 0;

        for kind in LinkMarker::ALL {
            for marker in markers.all(doc, kind) {
                // Anything meant to be kept was woven already.
                if kind.disposition() == Disposition::Encapsulate {
                    diagnostics.warn(
                        codes::LEFTOVER_SEMANTIC_LINK,
                        format!(
                            "dropping unresolved semantic link {}",
                            doc.attr(marker, "uri").unwrap_or("<no uri>")
                        ),
                        doc.path(marker),
                    );
                }
                doc.detach(marker);
                removed += 1;
            }
        }
        for tag in VENDOR_TAGS {
            for node in doc.elements_named(&self.config.vendor.metadata_namespace, tag) {
                doc.detach(node);
                removed += 1;
            }
        }
        removed
    }

    fn remove_vendor_elements(&self, doc: &mut DocumentTree) -> usize {
        let vendor = &self.config.vendor;
        let mut removed = 0;
        // Outermost first: a detached subtree is no longer reachable.
        for node in doc.elements() {
            if node == doc.root() || !doc.is_attached(node) {
                continue;
            }
            if doc.namespace_of(node).is_some_and(|ns| vendor.is_proprietary_namespace(ns)) {
                doc.detach(node);
                removed += 1;
            }
        }
        removed
    }

    /// Collect every offending attribute first, then remove them, so that
    /// prefixes still resolve while deciding.
    fn strip_attributes(&self, doc: &mut DocumentTree) -> usize {
        let vendor = &self.config.vendor;
        let token = vendor.domain_token.as_str();

        let doomed: Vec<(NodeId, String)> = doc
            .elements()
            .into_iter()
            .flat_map(|node| {
                doc.attributes(node)
                    .iter()
                    .filter(|a| {
                        let in_vendor_ns = !a.name.is_namespace_declaration()
                            && doc
                                .attr_namespace(node, &a.name)
                                .is_some_and(|ns| vendor.is_proprietary_namespace(ns));
                        in_vendor_ns
                            || vendor.is_proprietary_namespace(&a.value)
                            || vendor.exporter_attributes.iter().any(|e| a.name.local == e.as_str())
                            || (!token.is_empty() && a.value.contains(token))
                    })
                    .map(move |a| (node, a.name.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (node, name) in &doomed {
            doc.remove_attr(*node, name);
        }
        doomed.len()
    }
}
