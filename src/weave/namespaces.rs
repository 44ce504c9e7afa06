//! Namespace setup and URI rewriting (weaving steps 1, 6 and 7).

use crate::WeaveError;
use crate::annotation::AnnotationCodec;
use crate::config::{UriKind, WeaverConfig};
use crate::document::namespaces::XSI;
use crate::document::{Dialect, DocumentTree, NodeId, QName};

/// Prefix bound to the asset namespace base on the root element.
pub const ASSETS_PREFIX: &str = "assets";

/// Elements whose `href`/`namespace` point into other models.
pub const DATA_FLOW_ELEMENTS: [&str; 9] = [
    "import",
    "inputData",
    "requiredInput",
    "requiredKnowledge",
    "encapsulatedDecision",
    "outputDecision",
    "inputDecision",
    "requiredDecision",
    "requiredAuthority",
];

const DATA_FLOW_ATTRIBUTES: [&str; 3] = ["href", "namespace", "locationURI"];

// ============================================================================
// STEP 1: DIALECT AND SCHEMA LOCATION
// ============================================================================

/// Detect the dialect, set `xsi:schemaLocation` and bind the output namespaces.
pub fn prepare(doc: &mut DocumentTree, config: &WeaverConfig) -> Result<Dialect, WeaveError> {
    let dialect = Dialect::detect(doc)?;
    let location = config
        .schemas
        .location_for(dialect.namespace())
        .ok_or_else(|| WeaveError::MissingSchemaLocation(dialect.namespace().to_string()))?;

    let root = doc.root();
    let xsi = match doc.prefix_for(root, XSI) {
        Some(prefix) => prefix.to_string(),
        None => {
            doc.declare_namespace(root, "xsi", XSI);
            "xsi".to_string()
        }
    };
    doc.set_attr(root, &format!("{xsi}:schemaLocation"), location);
    AnnotationCodec::new(config).declare(doc);

    tracing::debug!(?dialect, "prepared document namespaces");
    Ok(dialect)
}

// ============================================================================
// STEP 6: NAMESPACE-BEARING ATTRIBUTES
// ============================================================================

/// Whether an attribute carries a namespace URI.
pub fn is_namespace_bearing(name: &QName) -> bool {
    name.is_namespace_declaration()
        || matches!(name.local.as_str(), "namespace" | "targetNamespace")
        || name.local.contains("include")
        || name.local.contains("ns")
}

/// Rewrite vendor model namespaces onto the artifact base and bind `assets:`.
pub fn rewrite_namespaces(doc: &mut DocumentTree, config: &WeaverConfig) -> usize {
    let mut rewritten = 0;
    for node in doc.elements() {
        rewritten += rewrite_attributes(doc, node, config, is_namespace_bearing);
    }

    let root = doc.root();
    doc.declare_namespace(root, ASSETS_PREFIX, &config.namespaces.asset_base);
    tracing::debug!(rewritten, "rewrote namespace attributes");
    rewritten
}

// ============================================================================
// STEP 7: CROSS-MODEL HREFS
// ============================================================================

/// Rewrite `href`/`namespace` on imports and data-flow elements.
pub fn rewrite_references(doc: &mut DocumentTree, config: &WeaverConfig) -> usize {
    let mut rewritten = 0;
    for node in doc.elements() {
        if !DATA_FLOW_ELEMENTS.contains(&doc.local_name(node)) {
            continue;
        }
        rewritten += rewrite_attributes(doc, node, config, |name| {
            name.prefix.is_none() && DATA_FLOW_ATTRIBUTES.contains(&name.local.as_str())
        });
    }
    tracing::debug!(rewritten, "rewrote cross-model references");
    rewritten
}

fn rewrite_attributes(
    doc: &mut DocumentTree,
    node: NodeId,
    config: &WeaverConfig,
    select: impl Fn(&QName) -> bool,
) -> usize {
    let Some(attributes) = doc.attributes_mut(node) else {
        return 0;
    };
    let mut rewritten = 0;
    for attribute in attributes.iter_mut().filter(|a| select(&a.name)) {
        if let Some(value) = config.rewrite_uri(&attribute.value, UriKind::Artifact) {
            attribute.value = value;
            rewritten += 1;
        }
    }
    rewritten
}
