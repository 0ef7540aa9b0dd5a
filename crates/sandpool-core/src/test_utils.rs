//! Shared test doubles.
//!
//! [`MockRuntime`] is an in-memory [`ContainerRuntime`] that tracks container
//! lifecycle, records every exec and copy, and lets tests script outputs and
//! failures per command substring.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::errors::SandboxError;
use crate::runtime::{ContainerRuntime, ExecutionResult};

#[derive(Default)]
struct MockState {
    existing: HashSet<String>,
    running: HashSet<String>,
    refuse_start: HashSet<String>,
    creates: HashMap<String, usize>,
    commands: Vec<(String, String)>,
    copies: Vec<(String, String, String)>,
    outputs: Vec<(String, ExecutionResult)>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
}

#[derive(Default)]
pub struct MockRuntime {
    state: Mutex<MockState>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output of any exec whose command contains `needle`.
    pub fn set_output(&self, needle: &str, result: ExecutionResult) {
        self.state
            .lock()
            .unwrap()
            .outputs
            .push((needle.to_string(), result));
    }

    /// Make any exec whose command contains `needle` fail at the host level.
    pub fn fail_command(&self, needle: &str) {
        self.state.lock().unwrap().failing.insert(needle.to_string());
    }

    /// Make any exec whose command contains `needle` never return.
    pub fn hang_command(&self, needle: &str) {
        self.state.lock().unwrap().hanging.insert(needle.to_string());
    }

    pub fn stop(&self, name: &str) {
        self.state.lock().unwrap().running.remove(name);
    }

    pub fn refuse_start(&self, name: &str) {
        self.state.lock().unwrap().refuse_start.insert(name.to_string());
    }

    pub fn allow_start(&self, name: &str) {
        self.state.lock().unwrap().refuse_start.remove(name);
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.state.lock().unwrap().existing.contains(name)
    }

    pub fn is_up(&self, name: &str) -> bool {
        self.state.lock().unwrap().running.contains(name)
    }

    pub fn running_count(&self) -> usize {
        self.state.lock().unwrap().running.len()
    }

    /// Highest number of create attempts seen for any single container name.
    pub fn max_creates_per_container(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .creates
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Every `(container, command)` exec'd so far, in order.
    pub fn commands(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Every `(container, dest_dir, file_name)` copied in so far, in order.
    pub fn copies(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().copies.clone()
    }
}

fn infra_error(message: &str) -> SandboxError {
    SandboxError::Io(std::io::Error::other(message.to_string()))
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn container_exists(&self, name: &str) -> Result<bool, SandboxError> {
        Ok(self.state.lock().unwrap().existing.contains(name))
    }

    async fn is_running(&self, name: &str) -> Result<bool, SandboxError> {
        Ok(self.state.lock().unwrap().running.contains(name))
    }

    async fn create_container(&self, name: &str, _image: &str) -> Result<(), SandboxError> {
        let mut state = self.state.lock().unwrap();
        *state.creates.entry(name.to_string()).or_insert(0) += 1;
        if state.refuse_start.contains(name) {
            return Err(infra_error("mock refused to create container"));
        }
        state.existing.insert(name.to_string());
        state.running.insert(name.to_string());
        Ok(())
    }

    async fn start_container(&self, name: &str) -> Result<(), SandboxError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_start.contains(name) {
            return Err(infra_error("mock refused to start container"));
        }
        if !state.existing.contains(name) {
            return Err(infra_error("no such container"));
        }
        state.running.insert(name.to_string());
        Ok(())
    }

    async fn copy_in(
        &self,
        name: &str,
        dest_dir: &str,
        file_name: &str,
        _contents: &[u8],
    ) -> Result<(), SandboxError> {
        self.state.lock().unwrap().copies.push((
            name.to_string(),
            dest_dir.to_string(),
            file_name.to_string(),
        ));
        Ok(())
    }

    async fn exec(&self, name: &str, command: &str) -> Result<ExecutionResult, SandboxError> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state
                .commands
                .push((name.to_string(), command.to_string()));
            if state
                .failing
                .iter()
                .any(|needle| command.contains(needle.as_str()))
            {
                return Err(infra_error("injected exec failure"));
            }
            if let Some((_, result)) = state
                .outputs
                .iter()
                .find(|(needle, _)| command.contains(needle.as_str()))
            {
                return Ok(result.clone());
            }
            state
                .hanging
                .iter()
                .any(|needle| command.contains(needle.as_str()))
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(ExecutionResult::default())
    }
}
