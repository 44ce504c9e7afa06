#![allow(clippy::unwrap_used)]

use crate::helpers::fixtures::*;
use rstest::rstest;
use weaver::{Identifier, WeaveError};

const ASSET: &str = "https://knowledge.example.org/assets/3c9e1f0a/versions/1.0.0";

fn asset_attribute(value: &str) -> String {
    format!(r#"<triso:customAttribute key="knowledgeAssetId" value="{value}"/>"#)
}

#[test]
fn test_single_asset_id_is_extracted() {
    let pipeline = pipeline();
    let doc = cmmn(&format!("<extensionElements>{}</extensionElements>", asset_attribute(ASSET)));

    let normalized = pipeline.normalize(doc).unwrap();

    let identifier = normalized.identifier.unwrap();
    assert_eq!(identifier.tag, "3c9e1f0a");
    assert_eq!(identifier.version_tag.as_deref(), Some("1.0.0"));
    assert_eq!(identifier.versioned_uri(), ASSET);
    assert!(normalized.document.elements_local("customAttribute").is_empty());
}

#[test]
fn test_missing_asset_id_is_silent() {
    let pipeline = pipeline();
    let woven = pipeline.weave(cmmn(r#"<case id="_c"/>"#)).unwrap();
    assert_eq!(woven.report.identifier, None);
    assert!(woven.report.diagnostics.is_empty());
}

#[rstest]
#[case("reuseLink")]
#[case("copyOfLink")]
fn test_asset_ids_inside_reused_fragments_are_ignored(#[case] link: &str) {
    let pipeline = pipeline();
    let doc = cmmn(&format!(
        r#"<extensionElements>{own}</extensionElements>
           <case id="_c"><casePlanModel id="_p">
             <stage id="_s"><extensionElements>
               <triso:{link} uri="http://www.trisotech.com/definitions/_lib#_stage"/>
             </extensionElements>
               <humanTask id="_h"><extensionElements>{phantom}</extensionElements></humanTask>
             </stage>
           </casePlanModel></case>"#,
        own = asset_attribute(ASSET),
        phantom = asset_attribute("https://knowledge.example.org/assets/ffff/versions/9"),
    ));

    let woven = pipeline.weave(doc).unwrap();

    assert_eq!(woven.report.identifier.unwrap().tag, "3c9e1f0a");
}

#[test]
fn test_two_distinct_asset_ids_are_fatal() {
    let pipeline = pipeline();
    let doc = cmmn(&format!(
        r#"<extensionElements>{}</extensionElements><case id="_c"><extensionElements>{}</extensionElements></case>"#,
        asset_attribute(ASSET),
        asset_attribute("https://knowledge.example.org/assets/other/versions/1.0.0"),
    ));

    let err = pipeline.weave(doc).unwrap_err();
    assert!(matches!(err, WeaveError::MultipleCandidates { count: 2, .. }));
}

#[test]
fn test_repeated_asset_id_is_one_candidate() {
    let pipeline = pipeline();
    let doc = cmmn(&format!(
        r#"<extensionElements>{}</extensionElements><case id="_c"><extensionElements>{}</extensionElements></case>"#,
        asset_attribute(ASSET),
        asset_attribute(ASSET),
    ));

    let woven = pipeline.weave(doc).unwrap();
    assert!(woven.report.identifier.is_some());
}

#[test]
fn test_derived_identifiers_are_deterministic() {
    let base = &config().namespaces.asset_base;
    let first = Identifier::derive("eligibility.dmn", base);
    assert_eq!(first, Identifier::derive("eligibility.dmn", base));
    assert_ne!(first, Identifier::derive("triage.dmn", base));
    assert!(first.uri.starts_with(base.as_str()));
}
