//! Concept resolution: the read-only oracle that turns a raw concept URI
//! into a canonical, categorized term.
//!
//! The pipeline only depends on the [`ConceptResolver`] trait. Two
//! implementations ship with the crate: [`StaticResolver`], a fixed table, and
//! [`CachingResolver`], which memoizes any other resolver.

use crate::config::WeaverConfig;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A resolved, canonical concept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptDescriptor {
    /// Canonical URI of the concept.
    pub referent_uri: String,
    /// URI of the scheme (namespace) the concept belongs to.
    pub namespace_uri: String,
    /// Human-readable label, when the resolver knows one.
    pub label: Option<String>,
    /// Broader concepts (transitive closure).
    pub closure: Vec<ConceptDescriptor>,
}

impl ConceptDescriptor {
    pub fn new(referent_uri: impl Into<String>, namespace_uri: impl Into<String>) -> Self {
        Self {
            referent_uri: referent_uri.into(),
            namespace_uri: namespace_uri.into(),
            label: None,
            closure: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_ancestor(mut self, ancestor: ConceptDescriptor) -> Self {
        self.closure.push(ancestor);
        self
    }

    /// The concept itself followed by its closure.
    fn lineage(&self) -> impl Iterator<Item = &ConceptDescriptor> {
        std::iter::once(self).chain(self.closure.iter())
    }
}

/// Category of a resolved concept, which drives relationship inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConceptCategory {
    DecisionType,
    KnowledgeAssetType,
    Domain,
    Other,
}

impl ConceptCategory {
    /// Categorize a concept by its own namespace or that of any broader concept.
    pub fn of(concept: &ConceptDescriptor, config: &WeaverConfig) -> Self {
        let schemes = &config.concept_schemes;
        let in_scheme = |scheme: &str| {
            !scheme.is_empty() && concept.lineage().any(|c| c.namespace_uri.starts_with(scheme))
        };

        if in_scheme(&schemes.decision_types) {
            ConceptCategory::DecisionType
        } else if in_scheme(&schemes.knowledge_asset_types) {
            ConceptCategory::KnowledgeAssetType
        } else if config.is_domain_concept(&concept.namespace_uri) {
            ConceptCategory::Domain
        } else {
            ConceptCategory::Other
        }
    }
}

/// Extract the concept UUID from a concept URI: the segment after the last
/// `#` or `/`.
pub fn concept_uuid(uri: &str) -> &str {
    let uri = uri.trim_end_matches(['/', '#']);
    uri.rsplit(['#', '/']).next().unwrap_or(uri)
}

/// Read-only lookup of concepts by UUID.
///
/// Implementations must be side-effect free from the pipeline's point of
/// view. A lookup that fails for any reason returns `None`; the pipeline
/// never retries.
pub trait ConceptResolver: Send + Sync {
    fn resolve(&self, uuid: &str) -> Option<ConceptDescriptor>;
}

impl<R: ConceptResolver + ?Sized> ConceptResolver for Arc<R> {
    fn resolve(&self, uuid: &str) -> Option<ConceptDescriptor> {
        (**self).resolve(uuid)
    }
}

impl<R: ConceptResolver + ?Sized> ConceptResolver for &R {
    fn resolve(&self, uuid: &str) -> Option<ConceptDescriptor> {
        (**self).resolve(uuid)
    }
}

// ============================================================================
// STATIC RESOLVER
// ============================================================================

/// A resolver backed by a fixed table.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver {
    concepts: IndexMap<String, ConceptDescriptor>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a concept under the UUID of its referent URI.
    pub fn with(mut self, concept: ConceptDescriptor) -> Self {
        self.insert(concept);
        self
    }

    pub fn insert(&mut self, concept: ConceptDescriptor) {
        let uuid = concept_uuid(&concept.referent_uri).to_string();
        self.concepts.insert(uuid, concept);
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

impl ConceptResolver for StaticResolver {
    fn resolve(&self, uuid: &str) -> Option<ConceptDescriptor> {
        self.concepts.get(uuid).cloned()
    }
}

// ============================================================================
// CACHING RESOLVER
// ============================================================================

/// Memoizes another resolver, including misses.
pub struct CachingResolver<R> {
    inner: R,
    cache: RwLock<FxHashMap<String, Option<ConceptDescriptor>>>,
}

impl<R: ConceptResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Number of cached lookups (hits and misses).
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    /// Forget every cached lookup.
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

impl<R: ConceptResolver> ConceptResolver for CachingResolver<R> {
    fn resolve(&self, uuid: &str) -> Option<ConceptDescriptor> {
        if let Some(hit) = self.cache.read().get(uuid) {
            return hit.clone();
        }
        let resolved = self.inner.resolve(uuid);
        self.cache.write().insert(uuid.to_string(), resolved.clone());
        resolved
    }
}
