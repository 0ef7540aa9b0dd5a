//! Build/run orchestration: one submission end to end.
//!
//! Detect the language, write the source to a unique host path, check a
//! container out of the pool, copy the source in, compile and run, and hand
//! back a single display string. The container is returned and the host
//! artifact removed on every path once they exist.

use std::sync::Arc;

use crate::errors::SandboxError;
use crate::language::Language;
use crate::pool::ContainerPool;
use crate::runtime::ExecutionResult;
use crate::source::{self, SourceArtifact};

pub struct CompileService {
    pool: Arc<ContainerPool>,
}

impl CompileService {
    pub fn new(pool: Arc<ContainerPool>) -> Self {
        Self { pool }
    }

    /// Compile and run a submission, returning text for direct display.
    /// Never fails: compiler diagnostics, program output, and error
    /// descriptions all come back through the same string.
    pub async fn compile_and_run(&self, code: &str) -> String {
        match self.execute(code).await {
            Ok(output) => output,
            Err(SandboxError::UnsupportedLanguage) => "Unsupported language".to_string(),
            Err(SandboxError::MissingClassName) => "Cannot extract public class name".to_string(),
            Err(e) => format!("Compilation/Execution error: {}", e),
        }
    }

    async fn execute(&self, code: &str) -> Result<String, SandboxError> {
        let language = Language::detect(code).ok_or(SandboxError::UnsupportedLanguage)?;
        let artifact = source::materialize(code, language, &self.pool.config().temp_root).await?;

        let container = match self.pool.acquire(language).await {
            Ok(container) => container,
            Err(e) => {
                artifact.cleanup().await;
                return Err(e);
            }
        };

        let result = self.run_in_container(&container, &artifact).await;

        // Unconditional, whatever happened inside the container.
        self.pool.release(language, container).await;
        artifact.cleanup().await;
        result
    }

    async fn run_in_container(
        &self,
        container: &str,
        artifact: &SourceArtifact,
    ) -> Result<String, SandboxError> {
        let config = self.pool.config();
        let profile = artifact.language.profile();

        // Entry-point-named languages share a file name across submissions,
        // so each job gets its own guest subdirectory. Everyone else carries
        // a unique file name and lands in the shared workspace.
        let guest_dir = if profile.needs_entry_point {
            format!("{}/{}", config.workspace_dir, artifact.job_id)
        } else {
            config.workspace_dir.clone()
        };

        // Stock images need not ship the workspace directory, and the
        // archive upload fails outright on a missing destination path.
        self.pool
            .run_command(container, &format!("mkdir -p {}", guest_dir))
            .await?;

        let contents = tokio::fs::read(&artifact.host_path).await?;
        self.pool
            .copy_in(container, &guest_dir, &artifact.file_name, &contents)
            .await?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        // A failing compile is not distinguished from a failing run here;
        // both steps' streams flow into the same aggregation.
        if let Some(compile_cmd) = profile.compile_command(&guest_dir, &artifact.entry) {
            let compiled = self.pool.run_command(container, &compile_cmd).await?;
            stdout.push_str(&compiled.stdout);
            stderr.push_str(&compiled.stderr);
        }

        let run_cmd = profile.run_command(&guest_dir, &artifact.entry);
        let ran = self.run_with_timeout(container, &run_cmd).await?;
        stdout.push_str(&ran.stdout);
        stderr.push_str(&ran.stderr);

        // Diagnostics on stderr beat program output; a fully silent run gets
        // an explicit placeholder.
        if !stderr.is_empty() {
            Ok(stderr)
        } else if !stdout.is_empty() {
            Ok(stdout)
        } else {
            Ok("No output".to_string())
        }
    }

    async fn run_with_timeout(
        &self,
        container: &str,
        command: &str,
    ) -> Result<ExecutionResult, SandboxError> {
        match self.pool.config().run_timeout {
            Some(limit) => tokio::time::timeout(limit, self.pool.run_command(container, command))
                .await
                .map_err(|_| SandboxError::Timeout)?,
            None => self.pool.run_command(container, command).await,
        }
    }
}
