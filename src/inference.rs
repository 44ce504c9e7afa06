//! Relationship inference for semantic annotations.
//!
//! The predicate of a fact depends on two things: the category of the
//! resolved concept and the structural role of the model element that owns
//! the annotation. The role is computed once as a [`StructuralContext`] and
//! dispatched with an exhaustive match.

use crate::annotation::{ConceptReference, RelationType, SemanticFact, owning_element};
use crate::concepts::{ConceptCategory, ConceptDescriptor, ConceptResolver, concept_uuid};
use crate::config::WeaverConfig;
use crate::document::{DocumentTree, NodeId};

/// Structural role of the element that owns an annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StructuralContext {
    Decision,
    InputData,
    CaseFileItem,
    CasePlanModel,
    Stage,
    Case,
    Task,
    DecisionTask,
    ProcessTask,
    CaseTask,
    HumanTask,
    Milestone,
    /// Any other element; carries the tag for reporting.
    Unclassified(String),
}

impl StructuralContext {
    pub fn from_tag(local: &str) -> Self {
        match local {
            "decision" => Self::Decision,
            "inputData" => Self::InputData,
            "caseFileItem" => Self::CaseFileItem,
            "casePlanModel" => Self::CasePlanModel,
            "stage" => Self::Stage,
            "case" => Self::Case,
            "task" => Self::Task,
            "decisionTask" => Self::DecisionTask,
            "processTask" => Self::ProcessTask,
            "caseTask" => Self::CaseTask,
            "humanTask" => Self::HumanTask,
            "milestone" => Self::Milestone,
            other => Self::Unclassified(other.to_string()),
        }
    }

    /// Context of a marker: the role of its owning model element.
    pub fn of(doc: &DocumentTree, marker: NodeId) -> Self {
        match owning_element(doc, marker) {
            Some(owner) => Self::from_tag(doc.local_name(owner)),
            None => Self::Unclassified(String::new()),
        }
    }

    /// Predicate for a domain concept annotated in this context.
    pub fn domain_predicate(&self) -> Option<RelationType> {
        match self {
            Self::Decision => Some(RelationType::Defines),
            Self::InputData | Self::CaseFileItem => Some(RelationType::InTermsOf),
            Self::CasePlanModel => Some(RelationType::HasPrimarySubject),
            Self::Stage
            | Self::Case
            | Self::Task
            | Self::DecisionTask
            | Self::ProcessTask
            | Self::CaseTask
            | Self::HumanTask => Some(RelationType::Captures),
            Self::Milestone => Some(RelationType::IsAbout),
            Self::Unclassified(_) => None,
        }
    }
}

/// Result of inferring the fact for one annotated element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inference {
    /// Emit this fact.
    Fact(SemanticFact),
    /// The concept is a knowledge-asset type; the relationship is implied
    /// elsewhere and no fact is emitted.
    Implied,
    /// A domain concept in a context with no known predicate.
    Unclassified {
        context: String,
        concept: ConceptDescriptor,
    },
    /// The concept did not resolve, or is neither a type nor a domain concept.
    Unresolved { uri: String },
    /// The marker carries no `uri`.
    MissingUri,
}

/// Computes the predicate for annotated elements.
pub struct RelationshipInference<'a> {
    config: &'a WeaverConfig,
    resolver: &'a dyn ConceptResolver,
}

impl<'a> RelationshipInference<'a> {
    pub fn new(config: &'a WeaverConfig, resolver: &'a dyn ConceptResolver) -> Self {
        Self { config, resolver }
    }

    /// Infer the fact for a marker element carrying a concept `uri`.
    pub fn infer(&self, doc: &DocumentTree, marker: NodeId) -> Inference {
        let Some(uri) = doc.attr(marker, "uri") else {
            return Inference::MissingUri;
        };
        let Some(concept) = self.resolver.resolve(concept_uuid(uri)) else {
            return Inference::Unresolved {
                uri: uri.to_string(),
            };
        };

        let predicate = match ConceptCategory::of(&concept, self.config) {
            ConceptCategory::DecisionType => RelationType::Captures,
            ConceptCategory::KnowledgeAssetType => return Inference::Implied,
            ConceptCategory::Domain => {
                let context = StructuralContext::of(doc, marker);
                match (context.domain_predicate(), context) {
                    (Some(predicate), _) => predicate,
                    (None, StructuralContext::Unclassified(tag)) => {
                        return Inference::Unclassified {
                            context: tag,
                            concept,
                        };
                    }
                    (None, other) => {
                        return Inference::Unclassified {
                            context: format!("{other:?}"),
                            concept,
                        };
                    }
                }
            }
            ConceptCategory::Other => {
                return Inference::Unresolved {
                    uri: uri.to_string(),
                };
            }
        };

        tracing::trace!(uri, predicate = predicate.as_str(), "inferred relationship");
        Inference::Fact(SemanticFact::new(
            Some(predicate),
            ConceptReference::resolved(uri, concept),
        ))
    }
}
