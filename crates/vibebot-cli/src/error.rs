use anyhow::Error;
use std::process::ExitCode;
use thiserror::Error as ThisError;
use vibebot_config::ConfigError;
use vibebot_core::CoreError;
use vibebot_scout::{GenerationError, ScoutError};
use vibebot_store::error::{StoreError, StoreErrorKind};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_BUSY: u8 = 4;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("mission aborted: {0}")]
    Aborted(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn aborted(message: impl Into<String>) -> Error {
    CliError::Aborted(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
                CliError::Aborted(_) => EXIT_FAILURE,
            });
        }
        if let Some(scout_err) = cause.downcast_ref::<ScoutError>() {
            return ExitCode::from(scout_exit_code(scout_err));
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return ExitCode::from(store_exit_code(store_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(generation_err) = cause.downcast_ref::<GenerationError>() {
            return ExitCode::from(generation_exit_code(generation_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn scout_exit_code(err: &ScoutError) -> u8 {
    match err {
        ScoutError::ResourceBusy(_) => EXIT_BUSY,
        ScoutError::Storage(store_err) => store_exit_code(store_err),
        ScoutError::Generation(generation_err) => generation_exit_code(generation_err),
        ScoutError::Unavailable(_) | ScoutError::Config(_) => EXIT_INVALID_INPUT,
        ScoutError::Authentication { .. }
        | ScoutError::Acquisition(_)
        | ScoutError::Engagement(_)
        | ScoutError::Http(_)
        | ScoutError::Parse(_)
        | ScoutError::Io(_) => EXIT_FAILURE,
    }
}

fn generation_exit_code(err: &GenerationError) -> u8 {
    match err {
        GenerationError::NotConfigured(_) => EXIT_INVALID_INPUT,
        GenerationError::Failed(_) => EXIT_FAILURE,
    }
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::NotFound => EXIT_NOT_FOUND,
        StoreErrorKind::InvalidId
        | StoreErrorKind::InvalidDataPath
        | StoreErrorKind::InvalidTransition
        | StoreErrorKind::Core => EXIT_INVALID_INPUT,
        StoreErrorKind::MissingHomeDir
        | StoreErrorKind::Migration
        | StoreErrorKind::Sql
        | StoreErrorKind::Json
        | StoreErrorKind::InvalidColumn
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidLimit(_)
        | ConfigError::InvalidLockTimeout(_)
        | ConfigError::InvalidThreshold(_)
        | ConfigError::InvalidMaxChars(_)
        | ConfigError::InvalidPlatform(_)
        | ConfigError::EmptyQueries
        | ConfigError::EmptySubreddits
        | ConfigError::InvalidField { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}
