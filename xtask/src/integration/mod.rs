//! Integration test infrastructure.
//!
//! Starts a Redis container, runs the workspace tests against it (the
//! Redis-backed tests skip themselves when no server is reachable), then
//! checks the CLI end to end.
//!
//! # Usage
//!
//! ```bash
//! # Run everything against a fresh container
//! cargo xtask integration
//!
//! # Publish Redis on another port
//! cargo xtask integration --port 6390
//!
//! # Skip container management (assumes Redis is already running)
//! cargo xtask integration --no-docker
//! ```

pub mod containers;
pub mod error;

pub use error::{IntegrationError, Result};

use std::time::Duration;

use crate::prelude::*;
use containers::{
    detect_runtime, is_running, start_container, stop_container, test_environment,
    wait_for_health, ContainerRuntime, REDIS_SPEC,
};

/// Integration test command.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Run the test suite against a real Redis.

Starts a Redis container with Docker or Podman, runs the coolredis
tests with REDIS_HOST and REDIS_PORT pointing at it, exercises the
coolredis CLI against the same server and removes the container.")]
pub struct IntegrationCommand {
    /// Host port Redis is published on.
    #[arg(long, default_value = "6379")]
    pub port: u16,

    /// Prefer Podman over Docker.
    #[arg(long)]
    pub podman: bool,

    /// Skip container management (assume Redis is already running).
    #[arg(long)]
    pub no_docker: bool,

    /// Keep the container running after tests complete.
    #[arg(long)]
    pub keep_containers: bool,

    /// Timeout in seconds for the container health check.
    #[arg(long, default_value = "30")]
    pub health_timeout: u64,
}

/// Main entry point for integration command.
pub async fn run(command: IntegrationCommand, global: crate::Global) -> Result<()> {
    if !global.is_silent() {
        aprintln!("{}", p_b("Integration Tests"));
        aprintln!();
    }

    let runtime = if command.no_docker {
        if !global.is_silent() {
            aprintln!(
                "{} {}",
                p_y("⚠️"),
                "Skipping Redis container management (--no-docker)"
            );
        }
        None
    } else {
        Some(detect_runtime(command.podman).await?)
    };

    let started = match runtime {
        Some(rt) => start_redis(rt, &command, &global).await?,
        None => false,
    };

    let env = test_environment(command.port);
    let mut all_passed = run_tests(&env, &global).await?;
    if all_passed {
        all_passed = run_cli_smoke(command.port, &global).await?;
    }

    if let Some(rt) = runtime.filter(|_| started) {
        if command.keep_containers {
            if !global.is_silent() {
                aprintln!("{} {}", p_y("⚠️"), "Container left running (--keep-containers)");
            }
        } else {
            stop_redis(rt, &global).await?;
        }
    }

    aprintln!();
    if all_passed {
        aprintln!("{} {}", p_g("✅"), p_g("All integration tests passed!"));
        Ok(())
    } else {
        aprintln!("{} {}", p_r("❌"), p_r("Some integration tests failed"));
        Err(IntegrationError::TestFailed(
            "One or more test suites failed".to_string(),
        ))
    }
}

/// Runs the workspace tests with the Redis environment set.
async fn run_tests(env: &[(&'static str, String)], global: &crate::Global) -> Result<bool> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("🔧"), p_b("Running coolredis tests..."));
    }

    let mut cmd = tokio::process::Command::new("cargo");
    cmd.args(["test", "-p", "coolredis_core", "-p", "coolredis"]);
    if global.is_verbose() {
        cmd.args(["--", "--nocapture"]);
    }
    cmd.envs(env.iter().map(|(k, v)| (*k, v.as_str())));

    let status = cmd.status().await?;
    if status.success() {
        if !global.is_silent() {
            aprintln!("{} {}", p_g("✅"), "Tests passed");
        }
        Ok(true)
    } else {
        aprintln!("{} {}", p_r("❌"), "Tests failed");
        Ok(false)
    }
}

/// Sets, reads back and deletes a key through the CLI binary.
async fn run_cli_smoke(port: u16, global: &crate::Global) -> Result<bool> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("🔧"), p_b("Running CLI smoke test..."));
    }

    let settings = format!(r#"{{"host":"localhost","port":{}}}"#, port);
    let steps: [&[&str]; 4] = [
        &["status"],
        &["set", "xtask:smoke", "ok", "--ttl", "30"],
        &["get", "xtask:smoke"],
        &["del", "xtask:smoke"],
    ];

    for step in steps {
        let output = tokio::process::Command::new("cargo")
            .args(["run", "--quiet", "-p", "coolredis", "--"])
            .args(step)
            .env("COOLREDIS_CONFIG", &settings)
            .output()
            .await?;

        if global.is_verbose() {
            aprintln!("  $ coolredis {}", step.join(" "));
            aprintln!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
        }

        if !output.status.success() {
            aprintln!(
                "{} `coolredis {}` failed: {}",
                p_r("❌"),
                step.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(false);
        }
    }

    if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), "CLI smoke test passed");
    }
    Ok(true)
}

/// Starts the Redis container. Returns `false` if one was already running.
async fn start_redis(
    runtime: ContainerRuntime,
    command: &IntegrationCommand,
    global: &crate::Global,
) -> Result<bool> {
    if is_running(runtime, REDIS_SPEC.name).await? {
        if !global.is_silent() {
            aprintln!("{} {}", p_y("⚠️"), "Redis container already running");
        }
        return Ok(false);
    }

    if !global.is_silent() {
        aprintln!("{} {}", p_b("🐳"), "Starting Redis container...");
    }

    start_container(runtime, &REDIS_SPEC, command.port).await?;

    if !global.is_silent() {
        aprintln!(
            "{} {}",
            p_b("⏳"),
            format!("Waiting for Redis health (max {}s)...", command.health_timeout)
        );
    }

    wait_for_health(
        runtime,
        &REDIS_SPEC,
        Duration::from_secs(command.health_timeout),
    )
    .await?;

    if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), "Redis is ready");
    }

    Ok(true)
}

async fn stop_redis(runtime: ContainerRuntime, global: &crate::Global) -> Result<()> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("🐳"), "Stopping Redis container...");
    }

    stop_container(runtime, REDIS_SPEC.name).await?;

    if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), "Redis container stopped");
    }

    Ok(())
}
