//! # kmodel-weaver
//!
//! Normalization of vendor-dialect DMN and CMMN models into standard,
//! annotated documents.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! pipeline    → Weave + redact facade, batch normalization
//!   ↓
//! weave       → Weaver steps: links, cross references, namespaces, repair
//! redact      → Proprietary-content stripping
//!   ↓
//! inference   → StructuralContext + relationship inference
//! identifier  → Governing asset identifier
//!   ↓
//! annotation  → Semantic facts and their XML fragments
//! concepts    → ConceptResolver trait and resolvers
//!   ↓
//! document    → Arena-indexed XML tree, quick-xml reader/writer, dialects
//! config      → Read-only configuration, vendor profile
//! diagnostics → Recoverable data-quality reports
//! error       → Fatal errors
//! ```

// ============================================================================
// MODULES (dependency order: document → concepts → annotation → weave → pipeline)
// ============================================================================

/// Fatal errors
pub mod error;

/// Recoverable data-quality diagnostics
pub mod diagnostics;

/// Read-only configuration and the vendor profile
pub mod config;

/// Namespace-aware XML document tree
pub mod document;

/// Concept resolution
pub mod concepts;

/// Semantic facts and the annotation codec
pub mod annotation;

/// Relationship inference
pub mod inference;

/// Versioned asset identifiers
pub mod identifier;

/// The Weaver and its steps
pub mod weave;

/// The Redactor
pub mod redact;

/// Weave + redact facade
pub mod pipeline;

pub use annotation::{AnnotationCodec, ConceptReference, OwnedFact, RelationType, SemanticFact};
pub use concepts::{CachingResolver, ConceptDescriptor, ConceptResolver, StaticResolver};
pub use config::{UriKind, VendorProfile, WeaverConfig, WeaverSettings};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use document::{Dialect, DocumentTree, NodeId, QName};
pub use error::WeaveError;
pub use identifier::Identifier;
pub use inference::{Inference, RelationshipInference, StructuralContext};
pub use pipeline::{Normalized, Pipeline, Redacted, Woven};
pub use redact::Redactor;
pub use weave::{BindingRewriter, NoBindings, WeaveReport, Weaver};
