pub mod engage;
pub mod error;
pub mod generate;
#[cfg(feature = "http")]
mod http;
pub mod orchestrator;
pub mod platform;
pub mod reddit;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod twitter;

pub use engage::{EngageOutcome, StepOutcome};
pub use error::{GenerationError, Result, ScoutError};
pub use generate::{AnthropicGenerator, ReplyGenerator};
pub use orchestrator::{FilterChain, MissionOptions, MissionReport, MissionState, Orchestrator};
pub use platform::{ensure_authenticated, PlatformClient};
pub use reddit::{RedditClient, RedditCredentials};
pub use scheduler::{Scheduler, Tick, TickOutcome};
pub use session::{SessionGuard, SessionLock};
pub use source::{Acquisition, CandidateSource, SourceOptions};
pub use twitter::{TwitterClient, TwitterCredentials};
