//! Weighted multi-signal classifier
//!
//! Each category scores `(Σ ratio_i * weight_i) * multiplier` over the four
//! evidence sources. The best score wins if it clears the threshold, otherwise
//! the taxonomy's fallback category is reported with the best score as its
//! confidence.

use super::evidence::{CategoryEvidence, Evidence};
use super::taxonomy::Taxonomy;
use crate::category::Category;
use crate::config::ConfigError;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Default minimum confidence for a detected category to stand
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Scores closer than this are considered tied
const SCORE_QUANTUM: f64 = 1e-9;

/// Relative weight of each evidence source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionWeights {
    pub files: f64,
    pub dependencies: f64,
    pub configs: f64,
    pub manifest_fields: f64,
}

impl Default for DetectionWeights {
    fn default() -> Self {
        Self {
            files: 0.4,
            dependencies: 0.3,
            configs: 0.2,
            manifest_fields: 0.1,
        }
    }
}

impl DetectionWeights {
    pub fn new(
        files: f64,
        dependencies: f64,
        configs: f64,
        manifest_fields: f64,
    ) -> Result<Self, ConfigError> {
        let weights = Self {
            files,
            dependencies,
            configs,
            manifest_fields,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn sum(&self) -> f64 {
        self.files + self.dependencies + self.configs + self.manifest_fields
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [self.files, self.dependencies, self.configs, self.manifest_fields];
        let sum = self.sum();
        if all.iter().any(|w| *w < 0.0 || !w.is_finite()) || (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// A category and its score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredCategory<C: Category> {
    pub category: C,
    pub score: f64,
}

/// Outcome of one classification call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult<C: Category> {
    pub root: PathBuf,
    pub category: C,
    /// Score of the winning category, or the best score when falling back
    pub confidence: f64,
    /// True when no category cleared the threshold
    pub fallback: bool,
    /// Every category's score, best first
    pub alternatives: Vec<ScoredCategory<C>>,
    pub evidence: BTreeMap<C, CategoryEvidence>,
}

impl<C: Category> ClassificationResult<C> {
    pub fn score_of(&self, category: C) -> Option<f64> {
        self.alternatives
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.score)
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    weights: DetectionWeights,
    threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            weights: DetectionWeights::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Classifier {
    pub fn new(weights: DetectionWeights, threshold: f64) -> Result<Self, ConfigError> {
        weights.validate()?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationFailed(format!(
                "Classification threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { weights, threshold })
    }

    pub fn weights(&self) -> &DetectionWeights {
        &self.weights
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Weighted score of one category's evidence, clamped to [0, 1]
    pub fn score(&self, evidence: &CategoryEvidence, multiplier: f64) -> f64 {
        let w = &self.weights;
        let raw = evidence.files.ratio() * w.files
            + evidence.dependencies.ratio() * w.dependencies
            + evidence.configs.ratio() * w.configs
            + evidence.manifest_fields.ratio() * w.manifest_fields;
        let score = raw * multiplier;
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }

    pub fn classify<C: Category>(
        &self,
        evidence: &Evidence<C>,
        taxonomy: &Taxonomy<C>,
    ) -> ClassificationResult<C> {
        let mut scored: Vec<(ScoredCategory<C>, i32)> = taxonomy
            .profiles()
            .iter()
            .map(|profile| {
                let score = self.score(&evidence.get(profile.category), profile.multiplier);
                (
                    ScoredCategory {
                        category: profile.category,
                        score,
                    },
                    profile.priority,
                )
            })
            .collect();

        scored.sort_by(|(a, pa), (b, pb)| rank(a, *pa, b, *pb));
        let alternatives: Vec<ScoredCategory<C>> = scored.into_iter().map(|(s, _)| s).collect();

        let (category, confidence, fallback) = match alternatives.first() {
            Some(best) if best.score + SCORE_QUANTUM >= self.threshold => {
                (best.category, best.score, false)
            }
            Some(best) => (taxonomy.fallback(), best.score, true),
            None => (taxonomy.fallback(), 0.0, true),
        };

        if fallback {
            debug!(
                "Best {} score {:.3} below threshold {}, falling back to {}",
                taxonomy.name(),
                confidence,
                self.threshold,
                category.id()
            );
        }
        info!(
            "Classified {} as {} ({:.1}% confidence)",
            evidence.root.display(),
            category.id(),
            confidence * 100.0
        );

        ClassificationResult {
            root: evidence.root.clone(),
            category,
            confidence,
            fallback,
            alternatives,
            evidence: evidence.categories.clone(),
        }
    }
}

fn quantize(score: f64) -> i64 {
    (score / SCORE_QUANTUM).round() as i64
}

/// Higher score first, then higher priority, then smaller identifier
fn rank<C: Category>(a: &ScoredCategory<C>, pa: i32, b: &ScoredCategory<C>, pb: i32) -> Ordering {
    quantize(b.score)
        .cmp(&quantize(a.score))
        .then_with(|| pb.cmp(&pa))
        .then_with(|| a.category.id().cmp(b.category.id()))
}
