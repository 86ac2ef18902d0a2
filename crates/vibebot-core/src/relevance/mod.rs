mod keyword;
mod semantic;

use crate::domain::RawCandidate;

pub use keyword::{KeywordPrefilter, DEFAULT_MUST_HAVE, DEFAULT_SKIP_WORDS};
pub use semantic::{SemanticFilter, DEFAULT_REFERENCES, DEFAULT_THRESHOLD};

/// Narrows raw candidates to the ones worth engaging with. Order is kept.
pub trait CandidateFilter: Send + Sync {
    fn name(&self) -> &'static str;
    fn filter(&self, candidates: Vec<RawCandidate>) -> Vec<RawCandidate>;
}

/// Lets every candidate through.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl CandidateFilter for PassThrough {
    fn name(&self) -> &'static str {
        "pass-through"
    }

    fn filter(&self, candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
        candidates
    }
}
