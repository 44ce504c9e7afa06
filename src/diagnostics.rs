//! Recoverable data-quality reporting.
//!
//! Every pass receives a `&mut Diagnostics` and records the problems it
//! tolerated (unresolved concepts, unclassifiable contexts, repaired values).
//! Each recorded warning is also logged through `tracing`.

use std::sync::Arc;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A diagnostic message with the location of the offending node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Diagnostic code (see [`codes`]).
    pub code: &'static str,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Document path of the node, when one applies.
    pub location: Option<Arc<str>>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Create a new informational diagnostic.
    pub fn info(code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Attach the document location.
    pub fn at(mut self, location: impl Into<Arc<str>>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes.
///
/// - **W0001-W0099**: weaving warnings
/// - **W0100-W0199**: redaction warnings
pub mod codes {
    /// A semantic link could not be resolved to a concept.
    pub const UNRESOLVED_CONCEPT: &str = "W0001";
    /// The structural context of an annotation is not classified.
    pub const UNCLASSIFIED_CONTEXT: &str = "W0002";
    /// A decision task has neither copy nor reuse marker to repair from.
    pub const MISSING_REPAIR_SOURCE: &str = "W0003";
    /// A cross-reference custom attribute has an unknown relationship kind.
    pub const UNKNOWN_REFERENCE_KIND: &str = "W0004";
    /// A cross-reference custom attribute has no enclosing task.
    pub const ORPHAN_REFERENCE: &str = "W0005";
    /// A semantic link is missing its `uri` attribute.
    pub const MISSING_CONCEPT_URI: &str = "W0006";
    /// A reuse/copy marker could not be resolved because it has no target.
    pub const MISSING_LINK_TARGET: &str = "W0007";
    /// An annotation fragment could not be decoded and was skipped.
    pub const MALFORMED_ANNOTATION: &str = "W0008";

    /// A malformed `definitionType` was replaced with a safe default.
    pub const REPAIRED_DEFINITION_TYPE: &str = "W0101";
    /// A semantic link survived weaving and was deleted.
    pub const LEFTOVER_SEMANTIC_LINK: &str = "W0102";
}

// ============================================================================
// COLLECTION
// ============================================================================

/// Ordered collection of diagnostics accumulated across pipeline steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic, logging warnings through `tracing`.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error | Severity::Warning => tracing::warn!(
                code = diagnostic.code,
                location = diagnostic.location.as_deref().unwrap_or(""),
                "{}",
                diagnostic.message
            ),
            Severity::Info => tracing::debug!(code = diagnostic.code, "{}", diagnostic.message),
        }
        self.items.push(diagnostic);
    }

    /// Record a warning at a document location.
    pub fn warn(&mut self, code: &'static str, message: impl Into<Arc<str>>, location: String) {
        self.push(Diagnostic::warning(code, message).at(location));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Whether any diagnostic carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    /// Number of diagnostics carrying `code`.
    pub fn count_code(&self, code: &str) -> usize {
        self.items.iter().filter(|d| d.code == code).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
