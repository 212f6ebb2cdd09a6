//! Estimate inference.
//!
//! Fills a missing estimate by finding the most similar already-estimated
//! task. The flow, driven by the caller:
//!
//! 1. [`EstimateEngine::keywords`] extracts search keywords from the title
//! 2. The tracker returns candidates matching those keywords
//! 3. [`EstimateEngine::infer`] scores every candidate and accepts the best
//!    one if it clears the threshold

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

use crate::similarity::{ContextWeights, string_similarity};
use crate::task::{Task, TaskId};

/// Splits titles on runs of anything that is not a letter or digit.
static KEYWORD_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

pub const DEFAULT_MIN_KEYWORD_LEN: usize = 3;
pub const DEFAULT_MAX_KEYWORDS: usize = 6;
pub const DEFAULT_ACCEPT_THRESHOLD: f64 = 0.90;
pub const DEFAULT_LABEL_WEIGHT: f64 = 0.6;
pub const DEFAULT_CONTEXT_WEIGHT: f64 = 0.4;

/// Configuration for estimate inference.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateConfig {
    /// Keywords shorter than this many characters are dropped. Default: 3.
    pub min_keyword_len: usize,

    /// At most this many keywords are searched for. Default: 6.
    pub max_keywords: usize,

    /// Minimum combined score for a match to be accepted. Default: 0.90.
    pub accept_threshold: f64,

    /// Weight of the title similarity in the combined score. Default: 0.6.
    pub label_weight: f64,

    /// Weight of the context similarity in the combined score. Default: 0.4.
    pub context_weight: f64,

    pub context: ContextWeights,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            min_keyword_len: DEFAULT_MIN_KEYWORD_LEN,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            accept_threshold: DEFAULT_ACCEPT_THRESHOLD,
            label_weight: DEFAULT_LABEL_WEIGHT,
            context_weight: DEFAULT_CONTEXT_WEIGHT,
            context: ContextWeights::default(),
        }
    }
}

/// The best candidate found for a task.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateMatch {
    pub candidate_id: TaskId,
    pub candidate_summary: String,
    pub estimate: Duration,
    pub score: f64,
}

/// Result of [`EstimateEngine::infer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    /// The best candidate cleared the threshold; its estimate was copied.
    Matched(EstimateMatch),
    /// The best candidate scored below the threshold; nothing was changed.
    BelowThreshold(EstimateMatch),
    /// No candidate had a positive estimate.
    NoCandidates,
}

/// A candidate paired with its combined score, only kept while searching.
struct CandidateMatch<'a> {
    candidate: &'a Task,
    score: f64,
}

/// Scores candidates and decides whether to adopt their estimate.
#[derive(Debug, Clone, Default)]
pub struct EstimateEngine {
    config: EstimateConfig,
}

impl EstimateEngine {
    pub const fn new(config: EstimateConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &EstimateConfig {
        &self.config
    }

    /// Whether `task` is a target for inference: it accepts estimates and has none.
    pub fn needs_estimate(task: &Task) -> bool {
        task.status.accepts_estimate() && !task.has_estimate()
    }

    /// Search keywords for a title. An empty result means the task is skipped.
    pub fn keywords(&self, summary: &str) -> Vec<String> {
        extract_keywords(
            summary,
            self.config.min_keyword_len,
            self.config.max_keywords,
        )
    }

    /// Combined title and context score of `candidate` for `target`.
    pub fn score(&self, target: &Task, candidate: &Task) -> f64 {
        let label = string_similarity(&target.summary, &candidate.summary);
        let context = self.config.context.score(target, candidate);
        self.config.label_weight * label + self.config.context_weight * context
    }

    /// Highest-scoring candidate with a positive estimate. Ties keep the earliest.
    fn best_candidate<'a>(
        &self,
        target: &Task,
        candidates: &'a [Task],
    ) -> Option<CandidateMatch<'a>> {
        let mut best: Option<CandidateMatch<'a>> = None;
        for candidate in candidates.iter().filter(|c| c.has_estimate()) {
            let score = self.score(target, candidate);
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(CandidateMatch { candidate, score });
            }
        }
        best
    }

    /// Picks the best candidate and, if it clears the threshold, copies its
    /// estimate into `target`. Candidates are never modified.
    pub fn infer(&self, target: &mut Task, candidates: &[Task]) -> Inference {
        let Some(best) = self.best_candidate(target, candidates) else {
            tracing::debug!(task = %target.id, "no estimated candidates");
            return Inference::NoCandidates;
        };

        let found = EstimateMatch {
            candidate_id: best.candidate.id.clone(),
            candidate_summary: best.candidate.summary.clone(),
            estimate: best.candidate.estimate,
            score: best.score,
        };

        if found.score >= self.config.accept_threshold && found.estimate > Duration::zero() {
            tracing::debug!(
                task = %target.id,
                candidate = %found.candidate_id,
                score = found.score,
                "accepted estimate match"
            );
            target.estimate = found.estimate;
            Inference::Matched(found)
        } else {
            tracing::debug!(
                task = %target.id,
                candidate = %found.candidate_id,
                score = found.score,
                "best match below threshold"
            );
            Inference::BelowThreshold(found)
        }
    }
}

/// Lower-cased, de-duplicated words of at least `min_len` characters, in
/// order of first appearance, capped at `max` entries.
pub fn extract_keywords(summary: &str, min_len: usize, max: usize) -> Vec<String> {
    let lowered = summary.trim().to_lowercase();
    let mut keywords: Vec<String> = Vec::new();
    for word in KEYWORD_SPLIT_RE.split(&lowered) {
        if keywords.len() >= max {
            break;
        }
        if word.is_empty() || word.chars().count() < min_len {
            continue;
        }
        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}
