//! Pooled Docker sandbox for compiling and running untrusted submissions.
//!
//! This crate is the compilation backend of an online exam platform: it takes
//! a raw source string, infers the language, and builds and runs it inside a
//! pre-provisioned Docker container, returning a single display string. The
//! HTTP layer, persistence, and authentication live elsewhere and consume
//! this crate through one call:
//! [`CompileService::compile_and_run`](compile::CompileService::compile_and_run).
//!
//! # Architecture Overview
//!
//! - **Language detection**: ordered substring heuristics over the source
//!   text; unsupported input short-circuits the pipeline
//! - **Source materialization**: per-submission unique temp files on the
//!   host, with entry-point-derived names where the language requires them
//! - **Container pooling**: a fixed-capacity pool of long-lived containers
//!   per language, with mutually exclusive checkout and lazy liveness repair
//! - **Orchestration**: copy in, compile, run, capture both streams, and
//!   guarantee container return and artifact cleanup on every path
//!
//! The pool and orchestrator sit behind the [`runtime::ContainerRuntime`]
//! trait, whose production implementation drives Docker via bollard.

pub mod compile;
pub mod config;
pub mod errors;
pub mod language;
pub mod pool;
pub mod runtime;
pub mod source;

pub use compile::CompileService;
pub use config::SandboxConfig;
pub use errors::SandboxError;
pub use language::{Language, LanguageProfile};
pub use pool::ContainerPool;
pub use runtime::{ContainerRuntime, DockerRuntime, ExecutionResult};
pub use source::SourceArtifact;

#[cfg(test)]
pub mod test_utils;
