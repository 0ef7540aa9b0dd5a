//! Sandbox configuration with environment-aware defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::language::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Base image per language, used when provisioning pool containers.
    pub images: HashMap<Language, String>,
    /// Containers kept per language. Fixed at configuration time; the pool
    /// never grows or shrinks at runtime.
    pub capacity: usize,
    /// Working directory inside every container.
    pub workspace_dir: String,
    /// Host directory for per-submission source artifacts.
    pub temp_root: PathBuf,
    /// Wall-clock limit on the guest run step. `None` waits indefinitely,
    /// so a hung program holds its container until restarted.
    pub run_timeout: Option<Duration>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let mut images = HashMap::new();
        images.insert(Language::Cpp, "gcc:13".to_string());
        images.insert(Language::Java, "eclipse-temurin:17-jdk".to_string());
        images.insert(Language::Python, "python:3.10-slim".to_string());
        Self {
            images,
            capacity: 4,
            workspace_dir: "/workspace".to_string(),
            temp_root: std::env::temp_dir().join("sandpool"),
            run_timeout: None,
        }
    }
}

impl SandboxConfig {
    /// Defaults overridden by `SANDPOOL_*` environment variables:
    /// `SANDPOOL_CAPACITY`, `SANDPOOL_CPP_IMAGE`, `SANDPOOL_JAVA_IMAGE`,
    /// `SANDPOOL_PYTHON_IMAGE`, `SANDPOOL_RUN_TIMEOUT_SECS` (0 disables).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(capacity) = std::env::var("SANDPOOL_CAPACITY") {
            match capacity.parse() {
                Ok(capacity) => config.capacity = capacity,
                Err(e) => log::warn!("Ignoring invalid SANDPOOL_CAPACITY: {}", e),
            }
        }
        for (language, var) in [
            (Language::Cpp, "SANDPOOL_CPP_IMAGE"),
            (Language::Java, "SANDPOOL_JAVA_IMAGE"),
            (Language::Python, "SANDPOOL_PYTHON_IMAGE"),
        ] {
            if let Ok(image) = std::env::var(var) {
                config.images.insert(language, image);
            }
        }
        if let Ok(secs) = std::env::var("SANDPOOL_RUN_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => config.run_timeout = (secs > 0).then(|| Duration::from_secs(secs)),
                Err(e) => log::warn!("Ignoring invalid SANDPOOL_RUN_TIMEOUT_SECS: {}", e),
            }
        }
        config
    }

    pub fn image_for(&self, language: Language) -> Option<&str> {
        self.images.get(&language).map(String::as_str)
    }

    /// The fixed container names for one language's pool.
    pub fn slot_names(&self, language: Language) -> Vec<String> {
        (1..=self.capacity)
            .map(|i| format!("{}-container-{}", language, i))
            .collect()
    }
}
