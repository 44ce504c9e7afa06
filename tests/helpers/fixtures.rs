//! Concepts, configuration and document wrappers shared by the tests.

use std::path::{Path, PathBuf};
use weaver::{ConceptDescriptor, DocumentTree, Pipeline, StaticResolver, WeaverConfig};

pub const CLINICAL: &str = "https://knowledge.example.org/taxonomies/clinicalsituations";
pub const DECISION_TYPES: &str = "https://knowledge.example.org/taxonomies/decisiontypes";
pub const ASSET_TYPES: &str = "https://knowledge.example.org/taxonomies/knowledgeassettypes";

pub const HEART_FAILURE: &str = "https://knowledge.example.org/taxonomies/clinicalsituations/c-hf";
pub const ASSESSMENT: &str = "https://knowledge.example.org/taxonomies/decisiontypes/dt-assessment";
pub const RULES_ASSET: &str = "https://knowledge.example.org/taxonomies/knowledgeassettypes/kat-rules";
pub const FOREIGN: &str = "urn:other:concepts/o-1";
pub const UNKNOWN: &str = "https://knowledge.example.org/taxonomies/retired/zzz";

pub const TRISO: &str = "http://www.trisotech.com/2015/triso/modeling";
pub const DMN_13: &str = "https://www.omg.org/spec/DMN/20191111/MODEL/";
pub const CMMN_11: &str = "http://www.omg.org/spec/CMMN/20151109/MODEL";

/// Resolver knowing every concept used by the fixtures.
pub fn resolver() -> StaticResolver {
    let clinical = |tag: &str, label: &str| {
        ConceptDescriptor::new(format!("{CLINICAL}/{tag}"), CLINICAL).with_label(label)
    };
    StaticResolver::new()
        .with(clinical("c-hf", "Heart failure"))
        .with(clinical("c-age", "Patient age"))
        .with(clinical("c-stable", "Hemodynamically stable"))
        .with(clinical("c-chest-pain", "Chest pain"))
        .with(ConceptDescriptor::new(ASSESSMENT, DECISION_TYPES).with_label("Assessment"))
        .with(ConceptDescriptor::new(RULES_ASSET, ASSET_TYPES).with_label("Rule set"))
        .with(ConceptDescriptor::new(FOREIGN, "urn:other:concepts"))
}

pub fn config() -> WeaverConfig {
    WeaverConfig::standard().unwrap()
}

pub fn pipeline() -> Pipeline<StaticResolver> {
    Pipeline::new(config(), resolver())
}

/// A CMMN document whose root holds `body`.
pub fn cmmn(body: &str) -> DocumentTree {
    DocumentTree::parse_str(&format!(
        r#"<definitions xmlns="{CMMN_11}" xmlns:triso="{TRISO}" id="_model"
             targetNamespace="http://www.trisotech.com/definitions/_model">{body}</definitions>"#
    ))
    .unwrap()
}

/// A DMN 1.3 document whose root holds `body`.
pub fn dmn(body: &str) -> DocumentTree {
    DocumentTree::parse_str(&format!(
        r#"<definitions xmlns="{DMN_13}" xmlns:triso="{TRISO}" id="_model"
             namespace="http://www.trisotech.com/definitions/_model">{body}</definitions>"#
    ))
    .unwrap()
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn load_fixture(name: &str) -> DocumentTree {
    let bytes = std::fs::read(fixtures_dir().join(name)).unwrap();
    DocumentTree::parse(&bytes).unwrap()
}
