//! Versioned resource identifiers.
//!
//! The governing identifier of a model is either read from a vendor custom
//! attribute (see [`extract`]) or derived deterministically from a context
//! string with [`Identifier::derive`].

use crate::WeaveError;
use crate::config::{UriKind, WeaverConfig};
use crate::document::DocumentTree;
use crate::weave::markers::{LinkMarker, Markers};
use std::fmt;
use uuid::Uuid;

const VERSIONS_SEGMENT: &str = "/versions/";

/// A versioned resource identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Unversioned URI: `<base><tag>`.
    pub uri: String,
    /// Last path segment of the URI.
    pub tag: String,
    pub version_tag: Option<String>,
}

impl Identifier {
    /// Parse `<base>/<tag>` or `<base>/<tag>/versions/<version>`.
    ///
    /// Values under the vendor model base are remapped to the asset base
    /// first. Returns `None` for values without a tag.
    pub fn parse(value: &str, config: &WeaverConfig) -> Option<Self> {
        let value = value.trim();
        let remapped = config.rewrite_uri(value, UriKind::Asset);
        let value = remapped.as_deref().unwrap_or(value);

        let (head, version) = match value.rfind(VERSIONS_SEGMENT) {
            Some(pos) => {
                let version = &value[pos + VERSIONS_SEGMENT.len()..];
                (&value[..pos], (!version.is_empty()).then(|| version.to_string()))
            }
            None => (value, None),
        };
        let head = head.trim_end_matches('/');
        let tag = head.rsplit('/').next().filter(|t| !t.is_empty() && *t != head)?;

        Some(Self {
            uri: head.to_string(),
            tag: tag.to_string(),
            version_tag: version,
        })
    }

    /// Derive a stable identifier under `base` from a context string.
    pub fn derive(context: &str, base: &str) -> Self {
        let tag = Uuid::new_v5(&Uuid::NAMESPACE_URL, context.as_bytes()).to_string();
        Self {
            uri: format!("{base}{tag}"),
            tag,
            version_tag: None,
        }
    }

    /// URI including the version segment, when there is one.
    pub fn versioned_uri(&self) -> String {
        match &self.version_tag {
            Some(version) => format!("{}{VERSIONS_SEGMENT}{version}", self.uri),
            None => self.uri.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.versioned_uri())
    }
}

/// Extract the governing identifier from the asset-id custom attribute.
///
/// Custom attributes that sit inside a reused or copied fragment belong to
/// the source model and are ignored. Several distinct candidates are fatal;
/// none is not.
pub fn extract(doc: &DocumentTree, config: &WeaverConfig) -> Result<Option<Identifier>, WeaveError> {
    let markers = Markers::new(&config.vendor);
    let mut candidates: Vec<Identifier> = Vec::new();

    for node in markers.all(doc, LinkMarker::CustomAttribute) {
        if doc.attr(node, "key") != Some(config.asset_id_attribute_key.as_str()) {
            continue;
        }
        if markers.within_marked(doc, node, &[LinkMarker::ReuseLink, LinkMarker::CopyLink]) {
            tracing::trace!(path = %doc.path(node), "skipping asset id inside reused fragment");
            continue;
        }
        let Some(identifier) = doc.attr(node, "value").and_then(|v| Identifier::parse(v, config))
        else {
            continue;
        };
        if !candidates.contains(&identifier) {
            candidates.push(identifier);
        }
    }

    match candidates.len() {
        0 | 1 => Ok(candidates.pop()),
        count => Err(WeaveError::MultipleCandidates {
            what: "asset identifier",
            count,
        }),
    }
}
