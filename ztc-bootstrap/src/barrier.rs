// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Barrier Probes
//!
//! Waits on the preconditions named by [`ztc_domain::Barrier`] before a
//! stage runs (§4.13 step 2b): `local` never waits; the rest poll a
//! readiness signal with bounded backoff until a deadline.

use std::time::Duration;

use rand::Rng;
use ztc_domain::{Barrier, ZtcError};

/// Default bound on how long any single barrier may wait (§4.13).
pub const DEFAULT_BARRIER_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const POLL_BASE: Duration = Duration::from_secs(2);
const POLL_MAX: Duration = Duration::from_secs(30);

/// Checks whether a barrier's precondition currently holds. Implementations
/// reach out to the cluster/host being bootstrapped; `CommandBarrierProbe`
/// does so by shelling out to an operator-supplied readiness command.
#[async_trait::async_trait]
pub trait BarrierProbe: Send + Sync {
    async fn is_ready(&self, barrier: Barrier) -> Result<bool, ZtcError>;
}

/// Runs a shell command per barrier kind and treats a zero exit status as
/// "ready". Commands not configured for a barrier default to "always ready"
/// (covers `Barrier::Local`/`Barrier::None`, which never gate on anything).
pub struct CommandBarrierProbe {
    commands: Vec<(Barrier, String)>,
}

impl CommandBarrierProbe {
    pub fn new(commands: Vec<(Barrier, String)>) -> Self {
        Self { commands }
    }

    fn command_for(&self, barrier: Barrier) -> Option<&str> {
        self.commands
            .iter()
            .find(|(b, _)| *b == barrier)
            .map(|(_, cmd)| cmd.as_str())
    }
}

#[async_trait::async_trait]
impl BarrierProbe for CommandBarrierProbe {
    async fn is_ready(&self, barrier: Barrier) -> Result<bool, ZtcError> {
        if matches!(barrier, Barrier::None | Barrier::Local) {
            return Ok(true);
        }

        let Some(command) = self.command_for(barrier) else {
            return Ok(true);
        };

        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .await
            .map_err(|e| ZtcError::Internal(format!("barrier probe command failed to start: {e}")))?;

        Ok(status.success())
    }
}

/// Always reports readiness immediately; used in tests that don't model
/// real infrastructure latency.
pub struct AlwaysReadyProbe;

#[async_trait::async_trait]
impl BarrierProbe for AlwaysReadyProbe {
    async fn is_ready(&self, _barrier: Barrier) -> Result<bool, ZtcError> {
        Ok(true)
    }
}

/// Polls `probe` until it reports readiness or `timeout` elapses. Backoff
/// grows `POLL_BASE * 2^attempt` capped at `POLL_MAX`, with up to 10% jitter
/// to avoid thundering-herd re-checks across concurrent stages.
pub async fn wait_for_barrier(
    probe: &dyn BarrierProbe,
    barrier: Barrier,
    stage: &str,
    timeout: Duration,
) -> Result<(), ZtcError> {
    if matches!(barrier, Barrier::None | Barrier::Local) {
        return Ok(());
    }

    let deadline = tokio::time::Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        if probe.is_ready(barrier).await? {
            return Ok(());
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(ZtcError::BarrierTimeout { stage: stage.to_string() });
        }

        let backoff = poll_delay(attempt);
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        tokio::time::sleep(backoff.min(remaining)).await;
        attempt = attempt.saturating_add(1);
    }
}

fn poll_delay(attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    let nominal = POLL_BASE.saturating_mul(exp as u32).min(POLL_MAX);
    let jitter_ms = rand::rng().random_range(0..=(nominal.as_millis() as u64 / 10).max(1));
    nominal + Duration::from_millis(jitter_ms)
}
