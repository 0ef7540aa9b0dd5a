//! Error types for the sandbox pipeline.
//!
//! Guest compile/run failures are deliberately absent from this taxonomy:
//! a non-zero exit or a populated stderr inside a container is ordinary
//! pipeline output, surfaced verbatim to the caller. Only faults of the
//! sandbox machinery itself (language classification, artifact handling,
//! pool exhaustion, the Docker transport) are modeled here, and they are
//! flattened to display text at the public boundary in
//! [`CompileService::compile_and_run`](crate::compile::CompileService::compile_and_run).

use thiserror::Error;

use crate::language::Language;

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Unsupported language")]
    UnsupportedLanguage,
    #[error("Cannot extract public class name")]
    MissingClassName,
    #[error("No available container for language: {0}")]
    NoAvailableSlot(Language),
    #[error("Container {0} could not be started")]
    SlotUnavailable(String),
    #[error("Bollard (Docker client) error: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("I/O error during sandbox operation: {0}")]
    Io(#[from] std::io::Error),
    #[error("UTF-8 decoding error from slice: {0}")]
    StrUtf8Error(#[from] std::str::Utf8Error),
    #[error("Execution timed out")]
    Timeout,
}
