#![allow(clippy::unwrap_used)]

use crate::helpers::fixtures::*;
use crate::helpers::tree_assertions::*;
use rstest::rstest;
use weaver::diagnostics::codes;
use weaver::weave::synthetic_id;

#[test]
fn test_copy_link_restores_decision_reference() {
    let pipeline = pipeline();
    let doc = cmmn(
        r#"<case id="_c"><casePlanModel id="_p">
             <decisionTask id="_t"><triso:copyOfLink uri="http://vendor/models/X#abc"/></decisionTask>
           </casePlanModel></case>"#,
    );

    let normalized = pipeline.normalize(doc).unwrap();
    let doc = &normalized.document;

    let expected = synthetic_id("http://vendor/models/X#abc");
    let task = element_by_id(doc, "_t").unwrap();
    assert_eq!(doc.attr(task, "decisionRef"), Some(expected.as_str()));

    let decision = element_by_id(doc, &expected).unwrap();
    assert_eq!(doc.local_name(decision), "decision");
    assert_eq!(doc.parent(decision), Some(doc.root()));
    assert_eq!(doc.attr(decision, "externalRef"), Some("ns1001:abc"));
    assert_eq!(doc.attr(doc.root(), "xmlns:ns1001"), Some("http://vendor/models/X"));
    assert!(doc.elements_local("copyOfLink").is_empty());
}

#[rstest]
#[case(1)]
#[case(3)]
fn test_every_unreferenced_task_gets_exactly_one_reference(#[case] tasks: usize) {
    let pipeline = pipeline();
    let body: String = (0..tasks)
        .map(|i| {
            format!(
                r#"<decisionTask id="_t{i}"><extensionElements>
                     <triso:reuseLink uri="http://www.trisotech.com/definitions/_lib#_d{i}"/>
                   </extensionElements></decisionTask>"#
            )
        })
        .collect();
    let doc = cmmn(&format!(r#"<case id="_c"><casePlanModel id="_p">{body}</casePlanModel></case>"#));

    let normalized = pipeline.normalize(doc).unwrap();
    let doc = &normalized.document;

    assert_eq!(doc.elements_local("decision").len(), tasks);
    for i in 0..tasks {
        let task = element_by_id(doc, &format!("_t{i}")).unwrap();
        let reference = doc.attr(task, "decisionRef").unwrap();
        let decision = element_by_id(doc, reference).unwrap();
        assert_eq!(
            doc.attr(decision, "externalRef").map(|r| r.ends_with(&format!(":_d{i}"))),
            Some(true)
        );
    }
    // One model, one binding.
    let bindings = doc
        .attributes(doc.root())
        .iter()
        .filter(|a| a.value == "https://knowledge.example.org/artifacts/lib")
        .count();
    assert_eq!(bindings, 1);
}

#[test]
fn test_task_with_reference_is_untouched() {
    let pipeline = pipeline();
    let doc = cmmn(
        r#"<decision id="_own" name="Own"/>
           <case id="_c"><casePlanModel id="_p">
             <decisionTask id="_t" decisionRef="_own">
               <triso:copyOfLink uri="http://vendor/models/X#abc"/>
             </decisionTask>
           </casePlanModel></case>"#,
    );

    let woven = pipeline.weave(doc).unwrap();

    assert_eq!(woven.report.repaired, 0);
    assert_eq!(woven.document.elements_local("decision").len(), 1);
}

#[test]
fn test_missing_marker_is_a_warning() {
    let pipeline = pipeline();
    let doc = cmmn(r#"<case id="_c"><casePlanModel id="_p"><decisionTask id="_t"/></casePlanModel></case>"#);

    let normalized = pipeline.normalize(doc).unwrap();

    assert!(normalized.diagnostics.has_code(codes::MISSING_REPAIR_SOURCE));
    let task = element_by_id(&normalized.document, "_t").unwrap();
    assert_eq!(normalized.document.attr(task, "decisionRef"), None);
}

#[test]
fn test_dmn_documents_are_not_repaired() {
    let pipeline = pipeline();
    let doc = dmn(r#"<decisionTask id="_t"/>"#);
    let woven = pipeline.weave(doc).unwrap();
    assert_eq!(woven.report.repaired, 0);
    assert!(!woven.report.diagnostics.has_code(codes::MISSING_REPAIR_SOURCE));
}
