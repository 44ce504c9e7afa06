#![allow(clippy::unwrap_used)]

use crate::helpers::fixtures::*;
use crate::helpers::tree_assertions::*;
use rstest::rstest;
use weaver::diagnostics::codes;
use weaver::redact::{DEFINITION_TYPE_UNSPECIFIED, DEFINITION_TYPE_XSD};

fn item_definition(attribute: Option<&str>) -> String {
    match attribute {
        Some(value) => format!(r#"<caseFileItemDefinition id="_cfd" definitionType="{value}"/>"#),
        None => r#"<caseFileItemDefinition id="_cfd"/>"#.to_string(),
    }
}

#[rstest]
#[case::missing(None, DEFINITION_TYPE_UNSPECIFIED, false)]
#[case::empty(Some(""), DEFINITION_TYPE_UNSPECIFIED, false)]
#[case::null(Some("null"), DEFINITION_TYPE_UNSPECIFIED, false)]
#[case::item_definition(
    Some("http://www.trisotech.com/2015/triso/modeling/ItemDefinitionType"),
    DEFINITION_TYPE_XSD,
    false
)]
#[case::other_vendor_type(
    Some("http://www.trisotech.com/2015/triso/modeling/DocumentType"),
    DEFINITION_TYPE_UNSPECIFIED,
    true
)]
#[case::standard(
    Some("http://www.omg.org/spec/CMMN/DefinitionType/XSDComplexType"),
    "http://www.omg.org/spec/CMMN/DefinitionType/XSDComplexType",
    false
)]
fn test_definition_type_repair(
    #[case] original: Option<&str>,
    #[case] expected: &str,
    #[case] warned: bool,
) {
    let pipeline = pipeline();
    let redacted = pipeline.redact(cmmn(&item_definition(original)));

    let item = element_by_id(&redacted.document, "_cfd").unwrap();
    assert_eq!(redacted.document.attr(item, "definitionType"), Some(expected));
    assert_eq!(redacted.diagnostics.has_code(codes::REPAIRED_DEFINITION_TYPE), warned);
}

#[test]
fn test_redaction_without_weaving_still_purifies() {
    let pipeline = pipeline();
    let redacted = pipeline.redact(load_fixture("heart_failure.cmmn"));

    assert_namespace_pure(&redacted.document, &pipeline.config().vendor);
    // Every semantic link was left unwoven.
    assert_eq!(redacted.diagnostics.count_code(codes::LEFTOVER_SEMANTIC_LINK), 4);
    assert_eq!(redacted.stats.definition_types, 3);
}

#[test]
fn test_redaction_keeps_standard_content() {
    let pipeline = pipeline();
    let redacted = pipeline.redact(load_fixture("heart_failure.cmmn"));
    let doc = &redacted.document;

    for id in ["_case", "_cpm", "_dt1", "_pt1", "_ms1", "_sh1", "_sh2"] {
        assert!(element_by_id(doc, id).is_some(), "{id} was removed");
    }
    let shape = element_by_id(doc, "_sh1").unwrap();
    assert_eq!(doc.attributes(shape).len(), 2);
    assert_eq!(doc.attr(doc.root(), "name"), Some("Heart Failure Management"));
}
