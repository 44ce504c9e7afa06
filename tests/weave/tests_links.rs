#![allow(clippy::unwrap_used)]

use crate::helpers::fixtures::*;
use crate::helpers::tree_assertions::*;
use weaver::{AnnotationCodec, Diagnostics, RelationType};

#[test]
fn test_every_reference_to_a_placeholder_is_repointed() {
    let pipeline = pipeline();
    let doc = dmn(
        r##"<decision id="_a"><informationRequirement><requiredDecision href="#_reused"/></informationRequirement></decision>
           <decision id="_b"><informationRequirement><requiredDecision href="#_reused"/></informationRequirement></decision>
           <decisionService id="_svc"><encapsulatedDecision href="#_reused"/></decisionService>
           <decision id="_reused"><extensionElements>
             <triso:reuseLink uri="http://www.trisotech.com/definitions/_lib#_shared"/>
           </extensionElements></decision>"##,
    );

    let woven = pipeline.weave(doc).unwrap();

    assert_eq!(woven.report.links.resolved, 1);
    assert_eq!(woven.report.links.repointed, 3);
    let doc = &woven.document;
    assert!(element_by_id(doc, "_reused").is_none());
    assert!(elements_with_attr(doc, "href", "#_reused").is_empty());
    let target = "https://knowledge.example.org/artifacts/lib#_shared";
    assert_eq!(elements_with_attr(doc, "href", target).len(), 3);
}

#[test]
fn test_no_reference_points_at_deleted_placeholders() {
    let pipeline = pipeline();
    let normalized = pipeline
        .normalize(load_fixture("accelerated_triage.dmn"))
        .unwrap();
    let doc = &normalized.document;

    assert!(element_by_id(doc, "_i_symptoms").is_none());
    for node in doc.elements() {
        for attribute in doc.attributes(node) {
            assert!(
                attribute.value != "_i_symptoms" && attribute.value != "#_i_symptoms",
                "dangling reference {}={} at {}",
                attribute.name,
                attribute.value,
                doc.path(node)
            );
        }
    }
    let required = doc.elements_local("requiredInput")[0];
    assert_eq!(
        doc.attr(required, "href"),
        Some("https://knowledge.example.org/artifacts/intake#_symptoms")
    );
    assert_eq!(doc.elements_local("DMNShape").len(), 1);
}

#[test]
fn test_accelerator_reuse_is_woven_in_place() {
    let pipeline = pipeline();
    let normalized = pipeline
        .normalize(load_fixture("accelerated_triage.dmn"))
        .unwrap();

    let decision = element_by_id(&normalized.document, "_d_priority");
    assert!(decision.is_some(), "accelerator placeholder must survive");

    let facts = AnnotationCodec::new(pipeline.config())
        .collect(&normalized.document, &mut Diagnostics::new());
    let priority: Vec<_> = facts
        .iter()
        .filter(|f| f.owner_id.as_deref() == Some("_d_priority"))
        .collect();
    assert_eq!(priority.len(), 1);
    assert_eq!(priority[0].fact.predicate, Some(RelationType::Defines));
}

#[test]
fn test_cmmn_placeholders_keep_their_element() {
    let pipeline = pipeline();
    let doc = cmmn(
        r#"<case id="_c"><casePlanModel id="_p">
             <humanTask id="_h"><extensionElements>
               <triso:reuseLink uri="http://www.trisotech.com/definitions/_lib#_review"/>
             </extensionElements></humanTask>
           </casePlanModel></case>"#,
    );

    let normalized = pipeline.normalize(doc).unwrap();

    assert!(element_by_id(&normalized.document, "_h").is_some());
    assert!(normalized.document.elements_local("reuseLink").is_empty());
}
