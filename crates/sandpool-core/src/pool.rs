//! Fixed-capacity pools of pre-provisioned language containers.
//!
//! One pool per language, capacity fixed at configuration time. Containers
//! are provisioned once at startup and reused across submissions; a stopped
//! container is restarted lazily on checkout. All pool state lives behind a
//! single mutex, so a container name is checked out to at most one caller at
//! a time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::SandboxConfig;
use crate::errors::SandboxError;
use crate::language::Language;
use crate::runtime::{ContainerRuntime, ExecutionResult};

#[derive(Default)]
struct PoolState {
    /// Per-language names currently available for checkout. Checkout pops
    /// from the back, return pushes to the back; order is not a correctness
    /// property.
    available: HashMap<Language, Vec<String>>,
    /// Names currently owned by a caller. Tracked so that neither a repeat
    /// `initialize` nor a `reconcile` sweep can re-admit a container that is
    /// busy running someone's code.
    checked_out: HashSet<String>,
}

pub struct ContainerPool {
    runtime: Arc<dyn ContainerRuntime>,
    config: SandboxConfig,
    state: Mutex<PoolState>,
}

impl ContainerPool {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: SandboxConfig) -> Self {
        Self {
            runtime,
            config,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Provision the configured containers for every language and fill the
    /// pools. Idempotent: existing containers are started only if stopped,
    /// and containers currently checked out are left alone. One container
    /// failing to provision is logged and skipped, never fatal to the rest.
    pub async fn initialize(&self) {
        for language in Language::ALL {
            let image = match self.config.image_for(language) {
                Some(image) => image.to_string(),
                None => {
                    log::error!("No base image configured for {}", language);
                    continue;
                }
            };

            let mut ready = Vec::new();
            for name in self.config.slot_names(language) {
                match self.provision(&name, &image).await {
                    Ok(()) => ready.push(name),
                    Err(e) => log::error!("Failed to provision container {}: {}", name, e),
                }
            }

            let mut state = self.state.lock().await;
            ready.retain(|name| !state.checked_out.contains(name));
            state.available.insert(language, ready);
        }
    }

    async fn provision(&self, name: &str, image: &str) -> Result<(), SandboxError> {
        if !self.runtime.container_exists(name).await? {
            self.runtime.create_container(name, image).await?;
            log::info!("Started container {}", name);
        } else if !self.runtime.is_running(name).await? {
            self.runtime.start_container(name).await?;
            log::info!("Container {} was stopped. Started it again.", name);
        } else {
            log::debug!("Container {} is already running.", name);
        }
        Ok(())
    }

    /// Check out a container for `language`. The caller owns it exclusively
    /// until it calls [`release`](Self::release). Fails fast with
    /// [`SandboxError::NoAvailableSlot`] when the pool is empty; there is no
    /// queueing or backoff.
    pub async fn acquire(&self, language: Language) -> Result<String, SandboxError> {
        let name = {
            let mut state = self.state.lock().await;
            let name = state
                .available
                .get_mut(&language)
                .and_then(|pool| pool.pop())
                .ok_or(SandboxError::NoAvailableSlot(language))?;
            state.checked_out.insert(name.clone());
            name
        };

        // Lazy liveness repair, bounded to one start attempt. A container
        // that will not come back leaves the pool until the next reconcile
        // sweep re-admits it.
        let alive = match self.runtime.is_running(&name).await {
            Ok(true) => Ok(()),
            Ok(false) => self.runtime.start_container(&name).await,
            Err(e) => Err(e),
        };

        match alive {
            Ok(()) => Ok(name),
            Err(e) => {
                log::error!("Container {} could not be revived: {}", name, e);
                self.state.lock().await.checked_out.remove(&name);
                Err(SandboxError::SlotUnavailable(name))
            }
        }
    }

    /// Return a checked-out container to its language pool. Call at most once
    /// per successful [`acquire`](Self::acquire).
    pub async fn release(&self, language: Language, name: String) {
        let mut state = self.state.lock().await;
        state.checked_out.remove(&name);
        state.available.entry(language).or_default().push(name);
    }

    /// Run a shell command inside a container, capturing both streams. Guest
    /// failures come back as data; only a host-level exec fault is an error.
    pub async fn run_command(
        &self,
        name: &str,
        command: &str,
    ) -> Result<ExecutionResult, SandboxError> {
        self.runtime.exec(name, command).await
    }

    /// Place a file inside a container's filesystem.
    pub async fn copy_in(
        &self,
        name: &str,
        dest_dir: &str,
        file_name: &str,
        contents: &[u8],
    ) -> Result<(), SandboxError> {
        self.runtime.copy_in(name, dest_dir, file_name, contents).await
    }

    /// Re-admit configured container names that have leaked out of the pools
    /// (a failed revival during acquire leaves its container orphaned).
    /// Intended to be driven periodically by the embedding service. Returns
    /// how many containers were re-admitted.
    pub async fn reconcile(&self) -> usize {
        let mut readmitted = 0;
        for language in Language::ALL {
            for name in self.config.slot_names(language) {
                {
                    let state = self.state.lock().await;
                    let pooled = state
                        .available
                        .get(&language)
                        .is_some_and(|pool| pool.contains(&name));
                    if pooled || state.checked_out.contains(&name) {
                        continue;
                    }
                }

                let revived = match self.runtime.is_running(&name).await {
                    Ok(true) => true,
                    Ok(false) => self.runtime.start_container(&name).await.is_ok(),
                    Err(_) => false,
                };
                if !revived {
                    continue;
                }

                // Re-check under the lock; an acquire or initialize may have
                // raced the liveness probe.
                let mut state = self.state.lock().await;
                if state.checked_out.contains(&name) {
                    continue;
                }
                let pool = state.available.entry(language).or_default();
                if !pool.contains(&name) {
                    log::info!("Re-admitted container {} to the {} pool", name, language);
                    pool.push(name.clone());
                    readmitted += 1;
                }
            }
        }
        readmitted
    }

    #[cfg(test)]
    pub(crate) async fn available_count(&self, language: Language) -> usize {
        self.state
            .lock()
            .await
            .available
            .get(&language)
            .map_or(0, Vec::len)
    }
}
