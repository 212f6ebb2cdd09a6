//! Similarity scores used to match an unestimated task against estimated ones.
//!
//! - [`string_similarity`]: Jaro-Winkler closeness of two task titles
//! - [`context_score`]: closeness of two tasks' project, parent and labels

use crate::task::Task;

/// Longest common prefix rewarded by the Winkler boost.
pub const WINKLER_PREFIX_LIMIT: usize = 4;

/// Weight of each shared prefix character in the Winkler boost.
pub const WINKLER_SCALE: f64 = 0.1;

/// Jaro-Winkler similarity of two short labels, in `[0, 1]`.
///
/// Both inputs are trimmed and lower-cased first. Equal labels score 1.0 and
/// an empty label scores 0.0 against anything else.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 1.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let jaro = jaro(&a, &b);
    let prefix = a
        .iter()
        .zip(&b)
        .take(WINKLER_PREFIX_LIMIT)
        .take_while(|(x, y)| x == y)
        .count();

    #[expect(clippy::cast_precision_loss, reason = "prefix is at most 4")]
    let boost = prefix as f64 * WINKLER_SCALE;
    jaro + boost * (1.0 - jaro)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "labels are far shorter than 2^52 characters"
)]
fn jaro(a: &[char], b: &[char]) -> f64 {
    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ch) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if b_matched[j] || b[j] != *ch {
                continue;
            }
            a_matched[i] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Walk both matched sequences in order and count misaligned pairs.
    let a_seq = matched(a, &a_matched);
    let b_seq = matched(b, &b_matched);
    let transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count();

    let m = matches as f64;
    let t = transpositions as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

fn matched<'a>(chars: &'a [char], flags: &'a [bool]) -> impl Iterator<Item = &'a char> {
    let pairs = chars.iter().zip(flags);
    pairs.filter(|(_, m)| **m).map(|(c, _)| c)
}

/// Weights of the structural terms in [`context_score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextWeights {
    /// Added when both tasks belong to the same project. Default: 0.4.
    pub project: f64,

    /// Added when both tasks share a non-empty parent. Default: 0.3.
    pub parent: f64,

    /// Scaled by the Jaccard index of the two label sets. Default: 0.2.
    pub labels: f64,
}

impl Default for ContextWeights {
    fn default() -> Self {
        Self {
            project: 0.4,
            parent: 0.3,
            labels: 0.2,
        }
    }
}

impl ContextWeights {
    /// Structural closeness of `candidate` to `target`, clamped to at most 1.0.
    pub fn score(&self, target: &Task, candidate: &Task) -> f64 {
        let mut score = 0.0;

        if target.project == candidate.project {
            score += self.project;
        }

        if let Some(parent) = target.parent.as_deref().filter(|p| !p.is_empty()) {
            if candidate.parent.as_deref() == Some(parent) {
                score += self.parent;
            }
        }

        if !target.labels.is_empty() && !candidate.labels.is_empty() {
            let shared = target.labels.intersection(&candidate.labels).count();
            let union = target.labels.union(&candidate.labels).count();
            #[expect(clippy::cast_precision_loss, reason = "label sets are tiny")]
            let jaccard = shared as f64 / union as f64;
            score += self.labels * jaccard;
        }

        score.clamp(0.0, 1.0)
    }
}

/// [`ContextWeights::score`] with the default weights.
pub fn context_score(target: &Task, candidate: &Task) -> f64 {
    ContextWeights::default().score(target, candidate)
}
