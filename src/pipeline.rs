//! Pipeline facade: weave, then redact.
//!
//! ```ignore
//! use weaver::{Pipeline, StaticResolver, WeaverConfig};
//!
//! let pipeline = Pipeline::new(WeaverConfig::standard()?, StaticResolver::new());
//! let normalized = pipeline.normalize_bytes(&raw)?;
//! for diagnostic in normalized.diagnostics.iter() {
//!     eprintln!("{diagnostic}");
//! }
//! let xml = normalized.document.to_xml()?;
//! ```

use crate::WeaveError;
use crate::annotation::{AnnotationCodec, OwnedFact};
use crate::concepts::ConceptResolver;
use crate::config::WeaverConfig;
use crate::diagnostics::Diagnostics;
use crate::document::{Dialect, DocumentTree};
use crate::identifier::Identifier;
use crate::redact::{RedactStats, Redactor};
use crate::weave::{NoBindings, WeaveReport, Weaver};
use rayon::prelude::*;

pub use crate::weave::BindingRewriter;

/// A woven, not yet redacted document.
#[derive(Clone, Debug)]
pub struct Woven {
    pub document: DocumentTree,
    pub report: WeaveReport,
}

/// A redacted document.
#[derive(Clone, Debug)]
pub struct Redacted {
    pub document: DocumentTree,
    pub stats: RedactStats,
    pub diagnostics: Diagnostics,
}

/// The result of the full pipeline.
#[derive(Clone, Debug)]
pub struct Normalized {
    pub document: DocumentTree,
    pub dialect: Dialect,
    pub identifier: Option<Identifier>,
    /// Weaving and redaction diagnostics, in pipeline order.
    pub diagnostics: Diagnostics,
}

impl Normalized {
    /// Harvest the semantic facts woven into the document.
    pub fn facts(&self, config: &WeaverConfig, diagnostics: &mut Diagnostics) -> Vec<OwnedFact> {
        AnnotationCodec::new(config).collect(&self.document, diagnostics)
    }
}

/// Owns the configuration, the concept resolver and the binding rewriter.
pub struct Pipeline<R> {
    config: WeaverConfig,
    resolver: R,
    bindings: Box<dyn BindingRewriter>,
}

impl<R: ConceptResolver> Pipeline<R> {
    pub fn new(config: WeaverConfig, resolver: R) -> Self {
        Self {
            config,
            resolver,
            bindings: Box::new(NoBindings),
        }
    }

    pub fn with_bindings(mut self, bindings: Box<dyn BindingRewriter>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn weave(&self, mut document: DocumentTree) -> Result<Woven, WeaveError> {
        let report = Weaver::new(&self.config, &self.resolver)
            .with_bindings(self.bindings.as_ref())
            .weave(&mut document)?;
        Ok(Woven { document, report })
    }

    pub fn redact(&self, mut document: DocumentTree) -> Redacted {
        let mut diagnostics = Diagnostics::new();
        let stats = Redactor::new(&self.config).redact(&mut document, &mut diagnostics);
        Redacted {
            document,
            stats,
            diagnostics,
        }
    }

    /// Weave then redact.
    pub fn normalize(&self, document: DocumentTree) -> Result<Normalized, WeaveError> {
        let Woven { document, report } = self.weave(document)?;
        let redacted = self.redact(document);

        let mut diagnostics = report.diagnostics;
        diagnostics.extend(redacted.diagnostics);
        Ok(Normalized {
            document: redacted.document,
            dialect: report.dialect,
            identifier: report.identifier,
            diagnostics,
        })
    }

    /// Parse and normalize raw XML.
    pub fn normalize_bytes(&self, input: &[u8]) -> Result<Normalized, WeaveError> {
        self.normalize(DocumentTree::parse(input)?)
    }

    /// Normalize independent documents in parallel.
    pub fn normalize_all(&self, documents: Vec<DocumentTree>) -> Vec<Result<Normalized, WeaveError>> {
        tracing::debug!(count = documents.len(), "normalizing batch");
        documents
            .into_par_iter()
            .map(|document| self.normalize(document))
            .collect()
    }
}
