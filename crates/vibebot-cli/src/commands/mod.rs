use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use vibebot_config::AppConfig;
use vibebot_store::Store;

pub mod daemon;
pub mod engage;
pub mod interactions;
pub mod scout;

pub const DEFAULT_LIST_LIMIT: i64 = 20;

pub struct Context<'a> {
    pub store: &'a Store,
    pub db_path: &'a Path,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
