//! Assertions over normalized documents.

use weaver::{DocumentTree, NodeId, VendorProfile};

/// Elements carrying an attribute with the given value.
pub fn elements_with_attr(doc: &DocumentTree, attr: &str, value: &str) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|n| doc.attr(*n, attr) == Some(value))
        .collect()
}

pub fn element_by_id(doc: &DocumentTree, id: &str) -> Option<NodeId> {
    elements_with_attr(doc, "id", id).into_iter().next()
}

/// Panics if any element or attribute is still vendor-proprietary.
pub fn assert_namespace_pure(doc: &DocumentTree, vendor: &VendorProfile) {
    for node in doc.elements() {
        if let Some(ns) = doc.namespace_of(node) {
            assert!(
                !vendor.is_proprietary_namespace(ns),
                "vendor element left at {}",
                doc.path(node)
            );
        }
        for attribute in doc.attributes(node) {
            let ns = doc.attr_namespace(node, &attribute.name);
            assert!(
                !ns.is_some_and(|ns| vendor.is_proprietary_namespace(ns)),
                "vendor attribute {} left at {}",
                attribute.name,
                doc.path(node)
            );
            assert!(
                !vendor.is_proprietary_namespace(&attribute.value),
                "vendor namespace binding {} left at {}",
                attribute.name,
                doc.path(node)
            );
            assert!(
                !attribute.value.contains(&vendor.domain_token),
                "vendor value {}={} left at {}",
                attribute.name,
                attribute.value,
                doc.path(node)
            );
        }
    }
}
