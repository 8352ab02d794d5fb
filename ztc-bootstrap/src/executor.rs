// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Executor
//!
//! The stage state machine of §4.13: `pending → waiting-barrier → running →
//! {succeeded, failed-retrying, failed-fatal, skipped-cached}`. Stages run
//! strictly sequentially in pipeline order; the executor is the sole writer
//! of the stage cache, and cancellation (SIGINT/SIGTERM) leaves the cache
//! consistent for the in-flight stage (P8).

use std::io::Write as _;
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use ztc_domain::{PipelineStage, ZtcError};

use crate::barrier::{wait_for_barrier, BarrierProbe, DEFAULT_BARRIER_TIMEOUT};
use crate::cache::StageCache;
use crate::extractor::RuntimeManifest;
use crate::platform::Platform;
use crate::shutdown::CancellationToken;
use crate::workspace::SecureWorkspace;

/// Terminal or transient outcome of running one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    SkippedCached,
    Succeeded,
    Cancelled,
}

/// Runs every stage in `pipeline` against `workspace`, in order.
pub struct BootstrapExecutor<'a> {
    workspace: &'a SecureWorkspace,
    platform: &'a dyn Platform,
    probe: &'a dyn BarrierProbe,
    manifest: &'a RuntimeManifest,
    cancellation: CancellationToken,
    skip_cache: bool,
}

impl<'a> BootstrapExecutor<'a> {
    pub fn new(
        workspace: &'a SecureWorkspace,
        platform: &'a dyn Platform,
        probe: &'a dyn BarrierProbe,
        manifest: &'a RuntimeManifest,
        cancellation: CancellationToken,
        skip_cache: bool,
    ) -> Self {
        Self {
            workspace,
            platform,
            probe,
            manifest,
            cancellation,
            skip_cache,
        }
    }

    /// Runs `pipeline` in order. Stops and returns `Err` on the first
    /// `failed-fatal` stage or on cancellation; later stages are never
    /// considered (§4.13 step 3).
    pub async fn run(&self, pipeline: &[PipelineStage]) -> Result<Vec<(String, StageOutcome)>, ZtcError> {
        let mut cache = StageCache::load(&self.workspace.stage_cache_path())?;
        let mut outcomes = Vec::with_capacity(pipeline.len());

        for stage in pipeline {
            if self.cancellation.is_cancelled() {
                return Err(ZtcError::Cancelled);
            }

            if !self.skip_cache {
                if let Some(cache_key) = &stage.cache_key {
                    if cache.is_cached_success(cache_key) {
                        outcomes.push((stage.name.clone(), StageOutcome::SkippedCached));
                        continue;
                    }
                }
            }

            wait_for_barrier(self.probe, stage.barrier, &stage.name, DEFAULT_BARRIER_TIMEOUT).await?;

            let outcome = self.run_stage_with_retry(stage, &mut cache).await?;
            outcomes.push((stage.name.clone(), outcome));

            if outcome == StageOutcome::Cancelled {
                return Err(ZtcError::Cancelled);
            }
        }

        Ok(outcomes)
    }

    async fn run_stage_with_retry(&self, stage: &PipelineStage, cache: &mut StageCache) -> Result<StageOutcome, ZtcError> {
        let max_attempts = stage.retry_policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.run_stage_once(stage).await? {
                RunResult::Success(exit_code) => {
                    if let Some(cache_key) = &stage.cache_key {
                        cache.record(&self.workspace.stage_cache_path(), cache_key, exit_code, Utc::now())?;
                    }
                    return Ok(StageOutcome::Succeeded);
                }
                RunResult::Cancelled => return Ok(StageOutcome::Cancelled),
                RunResult::Failed(exit_code) => {
                    if attempt == max_attempts {
                        return Err(ZtcError::ScriptFailed {
                            stage: stage.name.clone(),
                            exit_code,
                        });
                    }
                    tokio::time::sleep(backoff_with_jitter(stage.retry_policy.base_backoff, attempt)).await;
                }
            }
        }

        unreachable!("max_attempts is at least 1, loop always returns")
    }

    async fn run_stage_once(&self, stage: &PipelineStage) -> Result<RunResult, ZtcError> {
        let script_path = self
            .manifest
            .script_path(&stage.name)
            .ok_or_else(|| ZtcError::Internal(format!("no extracted script for stage {}", stage.name)))?;

        let ctx_path = self.workspace.ctx_dir().join(format!("{}.json", stage.name));
        let ctx_json = serde_json::to_vec_pretty(&stage.script.context)
            .map_err(|e| ZtcError::Internal(format!("failed to serialize stage context: {e}")))?;
        std::fs::write(&ctx_path, ctx_json)?;
        self.platform.set_owner_only_permissions(&ctx_path)?;

        let log_path = self.workspace.logs_dir().join(format!("{}.log", stage.name));
        let mut log_file = std::fs::File::create(&log_path)?;

        let mut child = Command::new(script_path)
            .current_dir(self.workspace.root())
            .env("ZTC_CONTEXT_FILE", ctx_path.as_os_str())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ZtcError::RenderFailure {
                adapter: stage.adapter.clone(),
                reason: format!("failed to start stage script: {e}"),
            })?;

        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");

        let result = tokio::select! {
            status = Self::stream_and_wait(&mut child, stdout, stderr, &mut log_file) => status,
            _ = self.cancellation.cancelled() => {
                Self::cancel_child(&mut child).await;
                let _ = std::fs::remove_file(&ctx_path);
                return Ok(RunResult::Cancelled);
            }
        };

        let status = result?;
        if status.success() {
            Ok(RunResult::Success(0))
        } else {
            Ok(RunResult::Failed(status.code().unwrap_or(-1)))
        }
    }

    async fn stream_and_wait(
        child: &mut tokio::process::Child,
        stdout: tokio::process::ChildStdout,
        stderr: tokio::process::ChildStderr,
        log_file: &mut std::fs::File,
    ) -> Result<std::process::ExitStatus, ZtcError> {
        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();
        let mut out_done = false;
        let mut err_done = false;

        while !out_done || !err_done {
            tokio::select! {
                line = out_lines.next_line(), if !out_done => {
                    match line.map_err(ZtcError::Io)? {
                        Some(text) => {
                            println!("{text}");
                            writeln!(log_file, "{text}").map_err(ZtcError::Io)?;
                        }
                        None => out_done = true,
                    }
                }
                line = err_lines.next_line(), if !err_done => {
                    match line.map_err(ZtcError::Io)? {
                        Some(text) => {
                            eprintln!("{text}");
                            writeln!(log_file, "{text}").map_err(ZtcError::Io)?;
                        }
                        None => err_done = true,
                    }
                }
            }
        }

        child.wait().await.map_err(ZtcError::Io)
    }

    async fn cancel_child(child: &mut tokio::process::Child) {
        #[cfg(unix)]
        {
            if let Some(pid) = child.id() {
                unsafe {
                    libc::kill(pid as i32, libc::SIGTERM);
                }
            }
        }

        let grace = Duration::from_secs(10);
        let exited = tokio::time::timeout(grace, child.wait()).await;
        if exited.is_err() {
            let _ = child.kill().await;
            let _ = child.wait().await;
        }
    }
}

enum RunResult {
    Success(i32),
    Failed(i32),
    Cancelled,
}

/// `base * 2^(attempt-1)` with 0-10% jitter, per §4.13 step 2e.
fn backoff_with_jitter(base: Duration, attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
    let nominal = base.saturating_mul(exp as u32);
    let jitter_ms = rand::rng().random_range(0..=(nominal.as_millis() as u64 / 10).max(1));
    nominal + Duration::from_millis(jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_with_the_attempt() {
        let base = Duration::from_secs(2);
        assert!(backoff_with_jitter(base, 1) >= base);
        assert!(backoff_with_jitter(base, 3) >= Duration::from_secs(8));
    }
}
