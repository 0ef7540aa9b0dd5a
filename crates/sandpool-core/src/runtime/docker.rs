//! Docker-backed [`ContainerRuntime`] using bollard.

use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CreateContainerOptions as BollardCreateContainerOptionsQuery,
    InspectContainerOptions as BollardInspectContainerOptionsQuery,
    ListContainersOptions as BollardListContainersOptionsQuery,
    StartContainerOptions as BollardStartContainerOptionsQuery,
    UploadToContainerOptions as BollardUploadToContainerOptionsQuery,
};
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::collections::HashMap;

use super::{ContainerRuntime, ExecutionResult};
use crate::errors::SandboxError;

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    pub fn new() -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    /// Whether the Docker daemon is reachable.
    pub async fn is_available(&self) -> bool {
        self.docker.ping().await.is_ok()
    }

    // The archive endpoint only accepts tar streams, so a single source file
    // is wrapped in an in-memory archive.
    fn single_file_archive(file_name: &str, contents: &[u8]) -> Result<Vec<u8>, SandboxError> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, file_name, contents)?;
        Ok(builder.into_inner()?)
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn container_exists(&self, name: &str) -> Result<bool, SandboxError> {
        let mut filters = HashMap::new();
        filters.insert("name".to_string(), vec![format!("^/{}$", name)]);
        let options = BollardListContainersOptionsQuery {
            all: true,
            filters: Some(filters),
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(!containers.is_empty())
    }

    async fn is_running(&self, name: &str) -> Result<bool, SandboxError> {
        let inspect = self
            .docker
            .inspect_container(name, None::<BollardInspectContainerOptionsQuery>)
            .await?;
        Ok(inspect
            .state
            .and_then(|state| state.running)
            .unwrap_or(false))
    }

    async fn create_container(&self, name: &str, image: &str) -> Result<(), SandboxError> {
        let options = Some(BollardCreateContainerOptionsQuery {
            name: Some(name.to_string()),
            ..Default::default()
        });
        let config = ContainerCreateBody {
            image: Some(image.to_string()),
            cmd: Some(vec![
                "tail".to_string(),
                "-f".to_string(),
                "/dev/null".to_string(),
            ]),
            ..Default::default()
        };
        self.docker.create_container(options, config).await?;
        self.docker
            .start_container(name, None::<BollardStartContainerOptionsQuery>)
            .await?;
        Ok(())
    }

    async fn start_container(&self, name: &str) -> Result<(), SandboxError> {
        self.docker
            .start_container(name, None::<BollardStartContainerOptionsQuery>)
            .await?;
        Ok(())
    }

    async fn copy_in(
        &self,
        name: &str,
        dest_dir: &str,
        file_name: &str,
        contents: &[u8],
    ) -> Result<(), SandboxError> {
        let archive = Self::single_file_archive(file_name, contents)?;
        let options = BollardUploadToContainerOptionsQuery {
            path: dest_dir.to_string(),
            ..Default::default()
        };
        self.docker
            .upload_to_container(name, Some(options), bollard::body_full(archive.into()))
            .await?;
        Ok(())
    }

    async fn exec(&self, name: &str, command: &str) -> Result<ExecutionResult, SandboxError> {
        let exec = self
            .docker
            .create_exec(
                name,
                CreateExecOptions {
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    cmd: Some(vec![
                        "sh".to_string(),
                        "-c".to_string(),
                        command.to_string(),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        let mut stdout = String::new();
        let mut stderr = String::new();
        if let StartExecResults::Attached { mut output, .. } =
            self.docker.start_exec(&exec.id, None).await?
        {
            while let Some(chunk) = output.next().await {
                match chunk? {
                    LogOutput::StdOut { message } => {
                        stdout.push_str(std::str::from_utf8(&message)?)
                    }
                    LogOutput::StdErr { message } => {
                        stderr.push_str(std::str::from_utf8(&message)?)
                    }
                    _ => {}
                }
            }
        }
        Ok(ExecutionResult { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_archive_holds_the_source() {
        let archive =
            DockerRuntime::single_file_archive("main_x.cpp", b"int main() { return 0; }").unwrap();

        let mut reader = tar::Archive::new(std::io::Cursor::new(archive));
        let mut entries = reader.entries().unwrap();
        let entry = entries.next().unwrap().unwrap();
        assert_eq!(
            entry.path().unwrap().to_str().unwrap(),
            "main_x.cpp"
        );
        assert_eq!(entry.size(), 24);
        assert!(entries.next().is_none());
    }
}
