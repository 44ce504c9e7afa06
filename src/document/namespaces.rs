//! Standard namespaces and source-dialect detection.

use super::DocumentTree;
use crate::WeaveError;

/// XSI namespace for `xsi:schemaLocation`.
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// DMN 1.1 model namespace.
pub const DMN_11: &str = "http://www.omg.org/spec/DMN/20151101/dmn.xsd";
/// DMN 1.2 model namespace.
pub const DMN_12: &str = "http://www.omg.org/spec/DMN/20180521/MODEL/";
/// DMN 1.3 model namespace.
pub const DMN_13: &str = "https://www.omg.org/spec/DMN/20191111/MODEL/";
/// CMMN 1.1 model namespace.
pub const CMMN_11: &str = "http://www.omg.org/spec/CMMN/20151109/MODEL";

/// Modeling language of a source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    Dmn(DmnVersion),
    Cmmn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DmnVersion {
    V11,
    V12,
    V13,
}

impl Dialect {
    /// The model namespace URI of this dialect.
    pub fn namespace(self) -> &'static str {
        match self {
            Dialect::Dmn(DmnVersion::V11) => DMN_11,
            Dialect::Dmn(DmnVersion::V12) => DMN_12,
            Dialect::Dmn(DmnVersion::V13) => DMN_13,
            Dialect::Cmmn => CMMN_11,
        }
    }

    pub fn from_namespace(uri: &str) -> Option<Self> {
        match uri {
            DMN_11 => Some(Dialect::Dmn(DmnVersion::V11)),
            DMN_12 => Some(Dialect::Dmn(DmnVersion::V12)),
            DMN_13 => Some(Dialect::Dmn(DmnVersion::V13)),
            CMMN_11 => Some(Dialect::Cmmn),
            _ => None,
        }
    }

    pub fn is_dmn(self) -> bool {
        matches!(self, Dialect::Dmn(_))
    }

    pub fn is_cmmn(self) -> bool {
        matches!(self, Dialect::Cmmn)
    }

    /// Whether reused elements can point at their source natively
    /// (CMMN `externalRef`). DMN placeholders must be resolved away instead.
    pub fn has_native_external_reference(self) -> bool {
        self.is_cmmn()
    }

    /// Detect the dialect from the root element.
    ///
    /// The root's own namespace wins; otherwise the first dialect namespace
    /// declared on the root is used.
    pub fn detect(doc: &DocumentTree) -> Result<Self, WeaveError> {
        let root = doc.root();
        if let Some(dialect) = doc.namespace_of(root).and_then(Self::from_namespace) {
            return Ok(dialect);
        }
        doc.attributes(root)
            .iter()
            .filter(|a| a.name.is_namespace_declaration())
            .find_map(|a| Self::from_namespace(&a.value))
            .ok_or_else(|| {
                WeaveError::UnsupportedDialect(format!(
                    "root <{}> declares no DMN or CMMN namespace",
                    doc.name(root).map(|n| n.to_string()).unwrap_or_default()
                ))
            })
    }
}
