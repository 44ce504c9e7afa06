//! Read-only pipeline configuration.
//!
//! [`WeaverSettings`] is the serializable form (what a caller loads from a
//! file); [`WeaverConfig`] is the validated value every component borrows.
//!
//! ```json
//! {
//!   "asset_id_attribute_key": "knowledgeAssetId",
//!   "domain_concept_namespace_pattern": "^https://knowledge\\.example\\.org/taxonomies/clinical",
//!   "asset_namespace_base": "https://knowledge.example.org/assets/",
//!   "artifact_namespace_base": "https://knowledge.example.org/artifacts/"
//! }
//! ```

use crate::WeaveError;
use crate::document::namespaces::{CMMN_11, DMN_11, DMN_12, DMN_13};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// NAMESPACE MAPPING
// ============================================================================

/// Whether a rewritten URI denotes a knowledge asset or a concrete artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UriKind {
    Asset,
    Artifact,
}

/// Target bases for rewritten vendor URIs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceMap {
    pub asset_base: String,
    pub artifact_base: String,
}

impl NamespaceMap {
    pub fn base(&self, kind: UriKind) -> &str {
        match kind {
            UriKind::Asset => &self.asset_base,
            UriKind::Artifact => &self.artifact_base,
        }
    }

    /// Replace `vendor_base` in `value` with the base for `kind`, dropping the
    /// leading underscore of the vendor id that follows it.
    ///
    /// `http://vendor/definitions/_abc#_d1` → `<artifact_base>abc#_d1`.
    /// Returns `None` when `value` does not contain `vendor_base`.
    pub fn rewrite(&self, value: &str, vendor_base: &str, kind: UriKind) -> Option<String> {
        if vendor_base.is_empty() {
            return None;
        }
        let start = value.find(vendor_base)?;
        let rest = &value[start + vendor_base.len()..];
        let rest = rest.strip_prefix('_').unwrap_or(rest);
        Some(format!("{}{}{}", &value[..start], self.base(kind), rest))
    }
}

// ============================================================================
// VENDOR PROFILE
// ============================================================================

/// Every literal that identifies the vendor dialect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorProfile {
    /// Namespace of the vendor metadata elements (`semanticLink`, `reuseLink`, ...).
    pub metadata_namespace: String,
    /// Vendor diagram extension namespace for DMN.
    pub dmn_diagram_namespace: String,
    /// Vendor diagram extension namespace for CMMN.
    pub cmmn_diagram_namespace: String,
    /// Third-party rules-engine extension namespace.
    pub rules_engine_namespace: String,
    /// Token whose presence in a value marks it as vendor-proprietary.
    pub domain_token: String,
    /// Base of vendor model namespaces, rewritten to the configured bases.
    pub model_base: String,
    /// Local names of exporter marker attributes.
    pub exporter_attributes: Vec<String>,
    /// Local name of the metadata attribute flagging generated decision services.
    pub dynamic_decision_service_attribute: String,
    /// `importType` token of imports with no standard counterpart.
    pub unsupported_import_token: String,
    /// Custom-attribute key prefix of non-model cross references.
    pub cross_reference_prefix: String,
    /// Attribute/value pairs that both mark a link as accelerator reuse.
    pub accelerator_classifier: [(String, String); 2],
}

impl Default for VendorProfile {
    fn default() -> Self {
        Self {
            metadata_namespace: "http://www.trisotech.com/2015/triso/modeling".into(),
            dmn_diagram_namespace: "http://www.trisotech.com/2016/triso/dmn".into(),
            cmmn_diagram_namespace: "http://www.trisotech.com/2014/triso/cmmn".into(),
            rules_engine_namespace: "http://www.drools.org/kie/dmn/1.2".into(),
            domain_token: "trisotech.com".into(),
            model_base: "http://www.trisotech.com/definitions/".into(),
            exporter_attributes: vec!["exporter".into(), "exporterVersion".into()],
            dynamic_decision_service_attribute: "dynamicDecisionService".into(),
            unsupported_import_token: "http://www.trisotech.com/graph/1.0/element".into(),
            cross_reference_prefix: "xref:".into(),
            accelerator_classifier: [
                ("modelType".into(), "http://www.trisotech.com/graph/1.0/element".into()),
                ("graphType".into(), "accelerator".into()),
            ],
        }
    }
}

impl VendorProfile {
    /// All namespaces whose elements and attributes are proprietary.
    pub fn proprietary_namespaces(&self) -> [&str; 4] {
        [
            &self.metadata_namespace,
            &self.dmn_diagram_namespace,
            &self.cmmn_diagram_namespace,
            &self.rules_engine_namespace,
        ]
    }

    pub fn is_proprietary_namespace(&self, uri: &str) -> bool {
        self.proprietary_namespaces().contains(&uri)
    }
}

// ============================================================================
// CONCEPT SCHEMES AND SCHEMAS
// ============================================================================

/// Namespace prefixes that categorize resolved concepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptSchemes {
    pub decision_types: String,
    pub knowledge_asset_types: String,
}

impl Default for ConceptSchemes {
    fn default() -> Self {
        Self {
            decision_types: "https://knowledge.example.org/taxonomies/decisiontypes".into(),
            knowledge_asset_types: "https://knowledge.example.org/taxonomies/knowledgeassettypes"
                .into(),
        }
    }
}

/// Dialect namespace → XSD location used for `xsi:schemaLocation`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaCatalog(pub IndexMap<String, String>);

impl Default for SchemaCatalog {
    fn default() -> Self {
        let mut map = IndexMap::new();
        map.insert(DMN_11.into(), "http://www.omg.org/spec/DMN/20151101/dmn.xsd".into());
        map.insert(DMN_12.into(), "http://www.omg.org/spec/DMN/20180521/MODEL/DMN12.xsd".into());
        map.insert(DMN_13.into(), "https://www.omg.org/spec/DMN/20191111/DMN13.xsd".into());
        map.insert(CMMN_11.into(), "http://www.omg.org/spec/CMMN/20151109/CMMN11.xsd".into());
        Self(map)
    }
}

impl SchemaCatalog {
    /// `xsi:schemaLocation` value for a dialect namespace.
    pub fn location_for(&self, namespace: &str) -> Option<String> {
        self.0
            .get(namespace)
            .map(|xsd| format!("{namespace} {xsd}"))
    }
}

// ============================================================================
// SETTINGS (serializable) → CONFIG (validated)
// ============================================================================

/// Serializable configuration, validated into a [`WeaverConfig`] by [`build`](Self::build).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaverSettings {
    pub asset_id_attribute_key: String,
    pub domain_concept_namespace_pattern: String,
    pub asset_namespace_base: String,
    pub artifact_namespace_base: String,
    pub annotation_namespace: String,
    pub annotation_prefix: String,
    pub vendor: VendorProfile,
    pub concept_schemes: ConceptSchemes,
    pub schemas: SchemaCatalog,
}

impl Default for WeaverSettings {
    fn default() -> Self {
        Self {
            asset_id_attribute_key: "knowledgeAssetId".into(),
            domain_concept_namespace_pattern: r"^https://knowledge\.example\.org/taxonomies/clinical"
                .into(),
            asset_namespace_base: "https://knowledge.example.org/assets/".into(),
            artifact_namespace_base: "https://knowledge.example.org/artifacts/".into(),
            annotation_namespace: "https://knowledge.example.org/annotations".into(),
            annotation_prefix: "ann".into(),
            vendor: VendorProfile::default(),
            concept_schemes: ConceptSchemes::default(),
            schemas: SchemaCatalog::default(),
        }
    }
}

impl WeaverSettings {
    pub fn with_asset_id_key(mut self, key: impl Into<String>) -> Self {
        self.asset_id_attribute_key = key.into();
        self
    }

    pub fn with_domain_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.domain_concept_namespace_pattern = pattern.into();
        self
    }

    pub fn with_bases(mut self, asset: impl Into<String>, artifact: impl Into<String>) -> Self {
        self.asset_namespace_base = asset.into();
        self.artifact_namespace_base = artifact.into();
        self
    }

    pub fn with_vendor(mut self, vendor: VendorProfile) -> Self {
        self.vendor = vendor;
        self
    }

    /// Validate and compile the settings.
    pub fn build(self) -> Result<WeaverConfig, WeaveError> {
        let pattern = Regex::new(&self.domain_concept_namespace_pattern).map_err(|e| {
            WeaveError::config(format!("domain concept namespace pattern: {e}"))
        })?;

        for (label, value) in [
            ("asset namespace base", &self.asset_namespace_base),
            ("artifact namespace base", &self.artifact_namespace_base),
            ("annotation namespace", &self.annotation_namespace),
            ("annotation prefix", &self.annotation_prefix),
            ("asset id attribute key", &self.asset_id_attribute_key),
        ] {
            if value.trim().is_empty() {
                return Err(WeaveError::config(format!("{label} must not be empty")));
            }
        }

        // A base that still contains the vendor base would be rewritten again
        // on every run.
        let vendor_base = &self.vendor.model_base;
        if !vendor_base.is_empty()
            && (self.asset_namespace_base.contains(vendor_base.as_str())
                || self.artifact_namespace_base.contains(vendor_base.as_str()))
        {
            return Err(WeaveError::config(format!(
                "namespace bases must not contain the vendor base {vendor_base}"
            )));
        }

        Ok(WeaverConfig {
            asset_id_attribute_key: self.asset_id_attribute_key,
            domain_concept_namespace_pattern: pattern,
            namespaces: NamespaceMap {
                asset_base: self.asset_namespace_base,
                artifact_base: self.artifact_namespace_base,
            },
            annotation_namespace: self.annotation_namespace,
            annotation_prefix: self.annotation_prefix,
            vendor: self.vendor,
            concept_schemes: self.concept_schemes,
            schemas: self.schemas,
        })
    }
}

/// Validated, immutable configuration shared by every component.
#[derive(Clone, Debug)]
pub struct WeaverConfig {
    pub asset_id_attribute_key: String,
    pub domain_concept_namespace_pattern: Regex,
    pub namespaces: NamespaceMap,
    pub annotation_namespace: String,
    pub annotation_prefix: String,
    pub vendor: VendorProfile,
    pub concept_schemes: ConceptSchemes,
    pub schemas: SchemaCatalog,
}

impl WeaverConfig {
    /// The default settings, validated.
    pub fn standard() -> Result<Self, WeaveError> {
        WeaverSettings::default().build()
    }

    /// Load settings from JSON; omitted fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, WeaveError> {
        let settings: WeaverSettings = serde_json::from_str(input)
            .map_err(|e| WeaveError::config(format!("JSON error: {e}")))?;
        settings.build()
    }

    /// Rewrite a vendor model URI onto the configured base for `kind`.
    pub fn rewrite_uri(&self, value: &str, kind: UriKind) -> Option<String> {
        self.namespaces.rewrite(value, &self.vendor.model_base, kind)
    }

    /// Whether `uri` falls in the domain-concept namespace.
    pub fn is_domain_concept(&self, uri: &str) -> bool {
        self.domain_concept_namespace_pattern.is_match(uri)
    }
}
