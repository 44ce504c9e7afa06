#![allow(clippy::unwrap_used)]

use crate::helpers::fixtures::*;
use rstest::rstest;
use weaver::diagnostics::codes;
use weaver::{AnnotationCodec, Diagnostics, DocumentTree, RelationType, Weaver};

fn annotated(tag: &str, uri: &str) -> DocumentTree {
    cmmn(&format!(
        r#"<{tag} id="_owner"><extensionElements><triso:semanticLink uri="{uri}"/></extensionElements></{tag}>"#
    ))
}

#[rstest]
#[case("decision", RelationType::Defines)]
#[case("inputData", RelationType::InTermsOf)]
#[case("caseFileItem", RelationType::InTermsOf)]
#[case("casePlanModel", RelationType::HasPrimarySubject)]
#[case("stage", RelationType::Captures)]
#[case("case", RelationType::Captures)]
#[case("task", RelationType::Captures)]
#[case("decisionTask", RelationType::Captures)]
#[case("processTask", RelationType::Captures)]
#[case("caseTask", RelationType::Captures)]
#[case("humanTask", RelationType::Captures)]
#[case("milestone", RelationType::IsAbout)]
fn test_domain_concept_predicate_by_context(#[case] tag: &str, #[case] expected: RelationType) {
    let config = config();
    let resolver = resolver();
    let mut doc = annotated(tag, HEART_FAILURE);

    let report = Weaver::new(&config, &resolver).weave(&mut doc).unwrap();

    assert_eq!(report.facts, 1);
    assert!(!report.diagnostics.has_code(codes::UNCLASSIFIED_CONTEXT));
    let facts = AnnotationCodec::new(&config).collect(&doc, &mut Diagnostics::new());
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].fact.predicate, Some(expected));
    assert_eq!(facts[0].owner_id.as_deref(), Some("_owner"));
    assert_eq!(facts[0].owner_tag, tag);
    assert_eq!(
        facts[0].fact.object.resolved.as_ref().and_then(|c| c.label.as_deref()),
        Some("Heart failure")
    );
}

#[rstest]
#[case("businessKnowledgeModel")]
#[case("sentry")]
#[case("planItem")]
fn test_unclassified_context_warns_without_fact(#[case] tag: &str) {
    let config = config();
    let resolver = resolver();
    let mut doc = annotated(tag, HEART_FAILURE);

    let report = Weaver::new(&config, &resolver).weave(&mut doc).unwrap();

    assert_eq!(report.facts, 0);
    assert_eq!(report.diagnostics.count_code(codes::UNCLASSIFIED_CONTEXT), 1);
    assert!(AnnotationCodec::new(&config).collect(&doc, &mut Diagnostics::new()).is_empty());
    assert!(doc.elements_local("semanticLink").is_empty());
}

#[rstest]
#[case("milestone")]
#[case("businessKnowledgeModel")]
fn test_decision_type_always_captures(#[case] tag: &str) {
    let config = config();
    let resolver = resolver();
    let mut doc = annotated(tag, ASSESSMENT);

    Weaver::new(&config, &resolver).weave(&mut doc).unwrap();

    let facts = AnnotationCodec::new(&config).collect(&doc, &mut Diagnostics::new());
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].fact.predicate, Some(RelationType::Captures));
}

#[test]
fn test_knowledge_asset_type_is_implied() {
    let config = config();
    let resolver = resolver();
    let mut doc = annotated("decision", RULES_ASSET);

    let report = Weaver::new(&config, &resolver).weave(&mut doc).unwrap();

    assert_eq!(report.facts, 0);
    assert!(report.diagnostics.is_empty());
    assert!(doc.elements_local("semanticLink").is_empty());
}

#[rstest]
#[case(UNKNOWN)]
#[case(FOREIGN)]
fn test_unresolved_or_foreign_concept_is_left_for_redaction(#[case] uri: &str) {
    let pipeline = pipeline();
    let woven = pipeline.weave(annotated("decision", uri)).unwrap();

    assert_eq!(woven.report.facts, 0);
    assert!(woven.report.diagnostics.has_code(codes::UNRESOLVED_CONCEPT));
    assert_eq!(woven.document.elements_local("semanticLink").len(), 1);

    let redacted = pipeline.redact(woven.document);
    assert!(redacted.diagnostics.has_code(codes::LEFTOVER_SEMANTIC_LINK));
    assert!(redacted.document.elements_local("semanticLink").is_empty());
}

#[test]
fn test_case_file_item_yields_exactly_one_in_terms_of() {
    let pipeline = pipeline();
    let doc = cmmn(&format!(
        r#"<case id="_c"><caseFileModel><caseFileItem id="_cfi" name="Labs">
             <extensionElements><triso:semanticLink uri="{HEART_FAILURE}"/></extensionElements>
           </caseFileItem></caseFileModel></case>"#
    ));

    let normalized = pipeline.normalize(doc).unwrap();
    let facts = normalized.facts(pipeline.config(), &mut Diagnostics::new());

    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].owner_id.as_deref(), Some("_cfi"));
    assert_eq!(facts[0].fact.predicate, Some(RelationType::InTermsOf));
    assert_eq!(facts[0].fact.object.uri, HEART_FAILURE);
}

#[test]
fn test_fragment_replaces_marker_in_place() {
    let config = config();
    let resolver = resolver();
    let mut doc = cmmn(&format!(
        r#"<milestone id="_m"><extensionElements>
             <triso:comment>keep order</triso:comment>
             <triso:semanticLink uri="{HEART_FAILURE}"/>
             <triso:attachment/>
           </extensionElements></milestone>"#
    ));

    Weaver::new(&config, &resolver).weave(&mut doc).unwrap();

    let ext = doc.elements_local("extensionElements")[0];
    let order: Vec<&str> = doc.child_elements(ext).map(|c| doc.local_name(c)).collect();
    assert_eq!(order, ["comment", "annotation", "attachment"]);
}
