//! Source materialization: writing submitted code to unique host paths.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::SandboxError;
use crate::language::{self, Language};

/// One submission's source on the host filesystem. Owned exclusively by the
/// in-flight invocation that created it and removed (best effort) when that
/// invocation finishes, whatever the outcome.
#[derive(Debug)]
pub struct SourceArtifact {
    pub language: Language,
    /// Process-unique id, also used as the guest subdirectory name for
    /// languages with a fixed entry-point file name.
    pub job_id: String,
    /// Entry-point name without extension: `main_<uuid>` or the public class name.
    pub entry: String,
    pub file_name: String,
    pub host_path: PathBuf,
    host_dir: Option<PathBuf>,
}

/// Write `code` under `temp_root` with a name unique across concurrent
/// invocations.
///
/// Languages whose source file must carry the declared public type name
/// (Java) get a fresh temp subdirectory holding `<TypeName>.<ext>`; a missing
/// declaration fails fast with [`SandboxError::MissingClassName`] before any
/// container is touched. Everything else gets `main_<uuid>.<ext>` directly in
/// the temp root.
pub async fn materialize(
    code: &str,
    language: Language,
    temp_root: &Path,
) -> Result<SourceArtifact, SandboxError> {
    tokio::fs::create_dir_all(temp_root).await?;
    let job_id = Uuid::new_v4().to_string();
    let profile = language.profile();

    if profile.needs_entry_point {
        let class_name =
            language::extract_public_class_name(code).ok_or(SandboxError::MissingClassName)?;
        let dir = tempfile::Builder::new()
            .prefix("sandpool-")
            .tempdir_in(temp_root)?;
        let file_name = format!("{}.{}", class_name, profile.extension);
        let host_path = dir.path().join(&file_name);
        tokio::fs::write(&host_path, code).await?;
        Ok(SourceArtifact {
            language,
            job_id,
            entry: class_name,
            file_name,
            host_path,
            host_dir: Some(dir.keep()),
        })
    } else {
        let entry = format!("main_{}", job_id);
        let file_name = format!("{}.{}", entry, profile.extension);
        let host_path = temp_root.join(&file_name);
        tokio::fs::write(&host_path, code).await?;
        Ok(SourceArtifact {
            language,
            job_id,
            entry,
            file_name,
            host_path,
            host_dir: None,
        })
    }
}

impl SourceArtifact {
    /// Best-effort removal. Failures are logged, never surfaced.
    pub async fn cleanup(&self) {
        let result = match &self.host_dir {
            Some(dir) => tokio::fs::remove_dir_all(dir).await,
            None => tokio::fs::remove_file(&self.host_path).await,
        };
        if let Err(e) = result {
            log::warn!(
                "Failed to remove temp artifact {}: {}",
                self.host_path.display(),
                e
            );
        }
    }
}
