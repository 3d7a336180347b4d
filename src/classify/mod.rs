//! Project classification
//!
//! One engine serves both taxonomies: [`EvidenceCollector`] walks a project
//! and counts signals per category, and [`Classifier`] turns those counts
//! into a [`ClassificationResult`].

pub mod classifier;
pub mod evidence;
pub mod library;
pub mod project;
pub mod taxonomy;

pub use classifier::{
    ClassificationResult, Classifier, DetectionWeights, ScoredCategory, DEFAULT_THRESHOLD,
};
pub use evidence::{
    bare_dependency_name, CategoryEvidence, Evidence, EvidenceCollector, GlobMemo, SourceMatch,
};
pub use taxonomy::{CategoryProfile, Compatibility, DetectionPatterns, SupportLevel, Taxonomy};
