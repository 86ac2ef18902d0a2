pub mod candidate;
pub mod ids;
pub mod interaction;
pub mod mission;
pub mod platform;

pub use candidate::RawCandidate;
pub use ids::InteractionId;
pub use interaction::{Interaction, InteractionStatus, InteractionUpsert, Metrics};
pub use mission::{MediaPolicy, MissionMode};
pub use platform::Platform;
