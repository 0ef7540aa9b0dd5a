//! Container runtime abstraction.
//!
//! The pool and the orchestrator talk to containers only through
//! [`ContainerRuntime`], so the checkout/lifecycle logic can be exercised
//! without a Docker daemon. The production implementation is
//! [`DockerRuntime`].

use async_trait::async_trait;

use crate::errors::SandboxError;

/// Captured output of one command executed inside a container.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Whether a container with this name exists, running or not.
    async fn container_exists(&self, name: &str) -> Result<bool, SandboxError>;

    async fn is_running(&self, name: &str) -> Result<bool, SandboxError>;

    /// Create and start a long-lived container named `name` from `image`,
    /// kept alive with a no-op foreground command.
    async fn create_container(&self, name: &str, image: &str) -> Result<(), SandboxError>;

    async fn start_container(&self, name: &str) -> Result<(), SandboxError>;

    /// Place `contents` at `<dest_dir>/<file_name>` inside the container.
    async fn copy_in(
        &self,
        name: &str,
        dest_dir: &str,
        file_name: &str,
        contents: &[u8],
    ) -> Result<(), SandboxError>;

    /// Execute a shell command inside the container, capturing both streams.
    /// A non-zero exit is not an error; guest diagnostics come back as data.
    /// Only a host-level fault of the exec mechanism itself errors.
    async fn exec(&self, name: &str, command: &str) -> Result<ExecutionResult, SandboxError>;
}

pub mod docker;

pub use docker::DockerRuntime;
