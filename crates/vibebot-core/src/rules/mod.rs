pub mod enrich;
pub mod reply;

pub use enrich::{enrich, materialize, normalize_external_id};
pub use reply::{clean_generated_reply, truncate_chars};
