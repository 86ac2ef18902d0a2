pub mod domain;
pub mod dto;
pub mod error;
pub mod relevance;
pub mod rules;
pub mod time;

pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use relevance::{CandidateFilter, KeywordPrefilter, PassThrough, SemanticFilter};
pub use rules::*;
