use crate::domain::RawCandidate;
use crate::error::CoreError;
use crate::relevance::CandidateFilter;
use std::collections::HashMap;

pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// On-topic example posts the similarity score is measured against.
pub const DEFAULT_REFERENCES: &[&str] = &[
    "Just shipped my side project after 2 weeks of vibe coding",
    "Building in public: launched my MVP today",
    "Weekend project turned into something real",
    "Finally launched the thing I've been working on",
    "Shipped a new feature for my indie project",
    "Just launched my SaaS MVP, looking for feedback",
    "Been building this side project, finally deployed it",
    "Vibe coded a tool to solve my own problem",
];

const MIN_TEXT_CHARS: usize = 10;

const STOPWORDS: &[&str] = &[
    "a", "am", "an", "and", "are", "at", "be", "been", "but", "by", "for", "from", "i", "in",
    "is", "it", "its", "me", "my", "of", "on", "or", "so", "that", "the", "this", "to", "was",
    "we", "with", "you", "your",
];

type TermVector = HashMap<String, f64>;

/// Similarity filter over term-frequency vectors: a candidate passes when its
/// best cosine score against the reference set reaches the threshold.
#[derive(Debug, Clone)]
pub struct SemanticFilter {
    references: Vec<TermVector>,
    threshold: f64,
}

impl Default for SemanticFilter {
    fn default() -> Self {
        Self {
            references: DEFAULT_REFERENCES.iter().map(|text| vectorize(text)).collect(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl SemanticFilter {
    pub fn new(references: &[String], threshold: f64) -> Result<Self, CoreError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(CoreError::InvalidThreshold(threshold));
        }
        let references = if references.is_empty() {
            DEFAULT_REFERENCES.iter().map(|text| vectorize(text)).collect()
        } else {
            references.iter().map(|text| vectorize(text)).collect()
        };
        Ok(Self {
            references,
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Relevance in `0.0..=1.0`.
    pub fn score(&self, text: &str) -> f64 {
        if text.trim().chars().count() < MIN_TEXT_CHARS {
            return 0.0;
        }
        let vector = vectorize(text);
        self.references
            .iter()
            .map(|reference| cosine(&vector, reference))
            .fold(0.0, f64::max)
    }
}

impl CandidateFilter for SemanticFilter {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn filter(&self, candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
        candidates
            .into_iter()
            .filter(|candidate| self.score(&candidate.content) >= self.threshold)
            .collect()
    }
}

fn vectorize(text: &str) -> TermVector {
    let mut vector = TermVector::new();
    for token in text
        .split(|ch: char| !ch.is_alphanumeric())
        .map(|token| token.to_lowercase())
        .filter(|token| token.chars().count() > 1 && !STOPWORDS.contains(&token.as_str()))
    {
        *vector.entry(stem(&token)).or_insert(0.0) += 1.0;
    }
    vector
}

// Suffix stripping only; enough to line up "shipped"/"ship", "launched"/"launch".
fn stem(token: &str) -> String {
    let mut word = token.to_string();
    for suffix in ["ing", "ed"] {
        if word.len() > suffix.len() + 2 && word.ends_with(suffix) {
            word.truncate(word.len() - suffix.len());
            let bytes = word.as_bytes();
            let n = bytes.len();
            if n >= 2 && bytes[n - 1] == bytes[n - 2] && !b"aeiouls".contains(&bytes[n - 1]) {
                word.pop();
            }
            return word;
        }
    }
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word.pop();
    }
    word
}

fn cosine(left: &TermVector, right: &TermVector) -> f64 {
    let dot: f64 = left
        .iter()
        .filter_map(|(term, weight)| right.get(term).map(|other| weight * other))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }
    let norm = |vector: &TermVector| vector.values().map(|w| w * w).sum::<f64>().sqrt();
    dot / (norm(left) * norm(right))
}

#[cfg(test)]
mod tests {
    use super::{stem, SemanticFilter};
    use crate::domain::RawCandidate;
    use crate::error::CoreError;
    use crate::relevance::CandidateFilter;

    #[test]
    fn relevant_scores_above_irrelevant() {
        let filter = SemanticFilter::default();
        let relevant = filter.score("I just shipped my MVP for a new SaaS app! #buildinpublic");
        let irrelevant = filter.score("I am hiring a software engineer for $150k.");
        assert!(relevant > irrelevant, "{relevant} <= {irrelevant}");
        assert!(relevant >= filter.threshold());
    }

    #[test]
    fn short_text_scores_zero() {
        let filter = SemanticFilter::default();
        assert_eq!(filter.score("ship it"), 0.0);
    }

    #[test]
    fn stem_aligns_inflections() {
        assert_eq!(stem("shipped"), "ship");
        assert_eq!(stem("launched"), "launch");
        assert_eq!(stem("building"), "build");
        assert_eq!(stem("projects"), "project");
    }

    #[test]
    fn filter_keeps_order() {
        let filter = SemanticFilter::default();
        let kept = filter.filter(vec![
            RawCandidate::new("a", "Launched my MVP today, building in public"),
            RawCandidate::new("b", "The weather is nice and sunny in the park"),
            RawCandidate::new("c", "Finally deployed my side project"),
        ]);
        let ids: Vec<_> = kept.iter().map(|c| c.external_post_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        assert!(SemanticFilter::new(&[], 0.0).is_err());
        assert_eq!(
            SemanticFilter::new(&[], 1.5).err(),
            Some(CoreError::InvalidThreshold(1.5))
        );
    }
}
