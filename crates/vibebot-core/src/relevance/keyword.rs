use crate::domain::RawCandidate;
use crate::relevance::CandidateFilter;

pub const DEFAULT_MUST_HAVE: &[&str] = &[
    "launch",
    "ship",
    "built",
    "building",
    "mvp",
    "project",
    "feedback",
    "vibe",
    "indie",
    "saas",
    "deploy",
    "release",
    "build in public",
    "buildinpublic",
    "side project",
    "startup",
    "coding",
];

pub const DEFAULT_SKIP_WORDS: &[&str] = &[
    "hiring",
    "job",
    "salary",
    "interview",
    "tutorial",
    "course",
    "learn",
    "beginner",
    "question",
];

/// Cheap substring filter: at least one must-have term and no skip word.
#[derive(Debug, Clone)]
pub struct KeywordPrefilter {
    must_have: Vec<String>,
    skip_words: Vec<String>,
}

impl Default for KeywordPrefilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MUST_HAVE.iter().map(|term| term.to_string()).collect(),
            DEFAULT_SKIP_WORDS.iter().map(|term| term.to_string()).collect(),
        )
    }
}

impl KeywordPrefilter {
    pub fn new(must_have: Vec<String>, skip_words: Vec<String>) -> Self {
        Self {
            must_have: normalize_terms(must_have),
            skip_words: normalize_terms(skip_words),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let has_keyword = self.must_have.iter().any(|term| lower.contains(term));
        let has_skip = self.skip_words.iter().any(|term| lower.contains(term));
        has_keyword && !has_skip
    }
}

impl CandidateFilter for KeywordPrefilter {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn filter(&self, candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
        candidates
            .into_iter()
            .filter(|candidate| self.matches(&candidate.content))
            .collect()
    }
}

fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::KeywordPrefilter;
    use crate::domain::RawCandidate;
    use crate::relevance::CandidateFilter;

    #[test]
    fn keeps_launches_drops_hiring_and_noise() {
        let filter = KeywordPrefilter::default();
        let kept = filter.filter(vec![
            RawCandidate::new("1", "Just launched my project"),
            RawCandidate::new("2", "Hiring a developer for my startup"),
            RawCandidate::new("3", "Random noise"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].external_post_id, "1");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let filter = KeywordPrefilter::new(vec!["MVP".to_string()], Vec::new());
        assert!(filter.matches("shipped the mvp"));
        assert!(!filter.matches("nothing here"));
    }
}
