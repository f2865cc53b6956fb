//! Redis container lifecycle for the integration suite.
//!
//! Argument building is pure and tested; everything that shells out to
//! Docker or Podman lives below it.

use std::time::Duration;

use tokio::process::Command;

use super::error::{IntegrationError, Result};

/// Container runtime (Docker or Podman).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerRuntime {
    #[default]
    Docker,
    Podman,
}

/// Specification for a throwaway Redis container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: &'static str,
    pub image: &'static str,
    /// Port inside the container.
    pub port: u16,
    pub command: Option<&'static str>,
}

pub const REDIS_SPEC: ContainerSpec = ContainerSpec {
    name: "coolredis-redis",
    image: "redis:7-alpine",
    port: 6379,
    command: Some("redis-server --save '' --appendonly no"),
};

/// Builds arguments for `docker run` / `podman run`, publishing the
/// container port on `host_port`.
pub fn container_run_args(spec: &ContainerSpec, host_port: u16) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--name".to_string(),
        spec.name.to_string(),
        "-d".to_string(),
        "-p".to_string(),
        format!("{}:{}", host_port, spec.port),
        spec.image.to_string(),
    ];

    if let Some(cmd) = spec.command {
        args.extend(cmd.split_whitespace().map(|s| s.trim_matches('\'').to_string()));
    }

    args
}

/// Environment the test binaries read to find Redis.
pub fn test_environment(host_port: u16) -> Vec<(&'static str, String)> {
    vec![
        ("REDIS_HOST", "localhost".to_string()),
        ("REDIS_PORT", host_port.to_string()),
    ]
}

pub fn runtime_command(runtime: ContainerRuntime) -> &'static str {
    match runtime {
        ContainerRuntime::Docker => "docker",
        ContainerRuntime::Podman => "podman",
    }
}

/// Detects which container runtime is available.
///
/// Checks Podman first when `prefer_podman` is set, Docker first otherwise.
pub async fn detect_runtime(prefer_podman: bool) -> Result<ContainerRuntime> {
    let check_order = if prefer_podman {
        [ContainerRuntime::Podman, ContainerRuntime::Docker]
    } else {
        [ContainerRuntime::Docker, ContainerRuntime::Podman]
    };

    for runtime in check_order {
        let output = Command::new(runtime_command(runtime))
            .arg("--version")
            .output()
            .await;

        if matches!(output, Ok(ref o) if o.status.success()) {
            return Ok(runtime);
        }
    }

    Err(IntegrationError::ContainerRuntimeNotFound(
        "Neither docker nor podman found in PATH".to_string(),
    ))
}

/// Whether a container called `name` is currently running.
pub async fn is_running(runtime: ContainerRuntime, name: &str) -> Result<bool> {
    let output = Command::new(runtime_command(runtime))
        .args(["ps", "-q", "-f", &format!("name={}", name)])
        .output()
        .await?;

    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Stops and removes a container. Missing containers are not an error.
pub async fn stop_container(runtime: ContainerRuntime, name: &str) -> Result<()> {
    let cmd = runtime_command(runtime);

    let _ = Command::new(cmd).args(["stop", name]).output().await;
    let _ = Command::new(cmd).args(["rm", name]).output().await;

    Ok(())
}

/// Replaces any container with the same name and starts a fresh one.
pub async fn start_container(
    runtime: ContainerRuntime,
    spec: &ContainerSpec,
    host_port: u16,
) -> Result<()> {
    stop_container(runtime, spec.name).await?;

    let output = Command::new(runtime_command(runtime))
        .args(container_run_args(spec, host_port))
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IntegrationError::ContainerStartFailed(format!(
            "Failed to start container '{}': {}",
            spec.name, stderr
        )));
    }

    Ok(())
}

/// Polls `redis-cli ping` inside the container until it answers or
/// `timeout` runs out.
pub async fn wait_for_health(
    runtime: ContainerRuntime,
    spec: &ContainerSpec,
    timeout: Duration,
) -> Result<()> {
    let start = std::time::Instant::now();
    let poll_interval = Duration::from_millis(500);

    while start.elapsed() < timeout {
        if check_redis_health(runtime, spec.name).await {
            return Ok(());
        }
        tokio::time::sleep(poll_interval).await;
    }

    Err(IntegrationError::ContainerNotHealthy {
        name: spec.name.to_string(),
        timeout_secs: timeout.as_secs(),
    })
}

async fn check_redis_health(runtime: ContainerRuntime, name: &str) -> bool {
    let output = Command::new(runtime_command(runtime))
        .args(["exec", name, "redis-cli", "ping"])
        .output()
        .await;

    match output {
        Ok(output) => {
            output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "PONG"
        }
        Err(_) => false,
    }
}
