#![allow(clippy::unwrap_used)]

use crate::helpers::fixtures::*;
use crate::helpers::tree_assertions::*;
use rstest::rstest;
use weaver::diagnostics::codes;

#[rstest]
#[case("dependsOn", "Depends_On")]
#[case("derivedFrom", "Derived_From")]
#[case("effectuates", "Effectuates")]
#[case("imports", "Imports")]
#[case("includes", "Includes")]
fn test_reference_kinds(#[case] key: &str, #[case] rel: &str) {
    let pipeline = pipeline();
    let doc = dmn(&format!(
        r#"<decision id="_d"><extensionElements>
             <triso:customAttribute key="xref:{key}" value="http://www.trisotech.com/definitions/_guide"/>
           </extensionElements></decision>"#
    ));

    let normalized = pipeline.normalize(doc).unwrap();
    let doc = &normalized.document;

    let references = doc.elements_local("processReference");
    assert_eq!(references.len(), 1);
    assert_eq!(doc.attr(references[0], "rel"), Some(rel));
    assert_eq!(
        doc.attr(references[0], "href"),
        Some("https://knowledge.example.org/artifacts/guide")
    );
    assert_eq!(doc.elements_local("process").len(), 0);
}

#[test]
fn test_nearest_task_receives_reference() {
    let pipeline = pipeline();
    let doc = cmmn(
        r#"<case id="_c"><casePlanModel id="_p">
             <humanTask id="_h">
               <documentation>Review labs</documentation>
               <triso:customAttribute key="xref:derivedFrom" value="urn:guideline:42"/>
             </humanTask>
           </casePlanModel></case>"#,
    );

    let woven = pipeline.weave(doc).unwrap();
    let doc = &woven.document;

    assert_eq!(woven.report.cross_references, 1);
    let task = element_by_id(doc, "_h").unwrap();
    let order: Vec<&str> = doc.child_elements(task).map(|c| doc.local_name(c)).collect();
    assert_eq!(order, ["documentation", "extensionElements"]);
    let reference = doc.elements_local("processReference")[0];
    assert_eq!(doc.attr(reference, "href"), Some("urn:guideline:42"));
}

#[test]
fn test_process_task_binds_external_process() {
    let pipeline = pipeline();
    let normalized = pipeline.normalize(load_fixture("heart_failure.cmmn")).unwrap();
    let doc = &normalized.document;

    let task = element_by_id(doc, "_pt1").unwrap();
    let process = element_by_id(doc, doc.attr(task, "processRef").unwrap()).unwrap();
    assert_eq!(doc.local_name(process), "process");
    assert_eq!(doc.attr(process, "name"), Some("Order Labs"));
    let external = doc.attr(process, "externalRef").unwrap();
    let (prefix, local) = external.split_once(':').unwrap();
    assert_eq!(local, "_order");
    assert_eq!(
        doc.resolve_prefix(doc.root(), Some(prefix)),
        Some("https://knowledge.example.org/artifacts/labs")
    );
}

#[test]
fn test_unknown_kind_is_reported_and_redacted() {
    let pipeline = pipeline();
    let doc = cmmn(
        r#"<case id="_c"><casePlanModel id="_p"><task id="_t"><extensionElements>
             <triso:customAttribute key="xref:mentions" value="urn:x"/>
           </extensionElements></task></casePlanModel></case>"#,
    );

    let normalized = pipeline.normalize(doc).unwrap();

    assert!(normalized.diagnostics.has_code(codes::UNKNOWN_REFERENCE_KIND));
    assert!(normalized.document.elements_local("processReference").is_empty());
    assert!(normalized.document.elements_local("customAttribute").is_empty());
}
