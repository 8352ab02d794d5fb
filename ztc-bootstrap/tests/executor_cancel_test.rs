// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cancellation scenario (§8 P8): a SIGINT/SIGTERM delivered mid-stage must
//! leave the stage cache consistent (no entry for the in-flight stage) and
//! remove its context file, rather than leaving a half-written run behind.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use ztc_bootstrap::barrier::AlwaysReadyProbe;
use ztc_bootstrap::cache::StageCache;
use ztc_bootstrap::executor::{BootstrapExecutor, StageOutcome};
use ztc_bootstrap::extractor::{ScriptExtractor, StageScript};
use ztc_bootstrap::platform::create_platform;
use ztc_bootstrap::shutdown::ShutdownCoordinator;
use ztc_bootstrap::workspace::SecureWorkspace;
use ztc_domain::{Barrier, PipelineStage, RetryPolicy, ScriptReference, StageBucket, ZtcError};

fn long_running_script() -> &'static [u8] {
    b"#!/bin/sh\nsleep 30\n"
}

#[tokio::test]
async fn cancellation_mid_stage_leaves_the_cache_and_context_clean() {
    let platform = create_platform();
    let workspace = SecureWorkspace::create(platform.as_ref(), false).unwrap();

    let pipeline_stage = PipelineStage {
        name: "long-stage".to_string(),
        adapter: "test-adapter".to_string(),
        bucket: StageBucket::Bootstrap,
        description: "a stage that sleeps well past the cancellation we send it".to_string(),
        script: ScriptReference::new("test-adapter", "long-stage.sh", json!({})),
        cache_key: Some("long-stage".to_string()),
        barrier: Barrier::None,
        retry_policy: RetryPolicy {
            max_attempts: 1,
            base_backoff: Duration::from_millis(1),
        },
    };

    let stage_script = StageScript {
        stage: "long-stage".to_string(),
        adapter: "test-adapter".to_string(),
        relative_path: PathBuf::from("long-stage.sh"),
        contents: long_running_script(),
    };

    let manifest = ScriptExtractor::extract(&workspace, platform.as_ref(), &[stage_script]).unwrap();
    let probe = AlwaysReadyProbe;

    let coordinator = ShutdownCoordinator::default();
    let cancellation = coordinator.token();

    let executor = BootstrapExecutor::new(&workspace, platform.as_ref(), &probe, &manifest, cancellation.clone(), false);

    let run_future = executor.run(std::slice::from_ref(&pipeline_stage));
    tokio::pin!(run_future);

    // Give the child process a moment to actually spawn and write its
    // context file before we cancel it.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let ctx_path = workspace.ctx_dir().join("long-stage.json");
    assert!(ctx_path.exists(), "context file should exist while the stage is running");

    coordinator.initiate_shutdown();

    let result = tokio::time::timeout(Duration::from_secs(15), run_future).await.expect("executor did not react to cancellation in time");
    let err = result.unwrap_err();
    assert!(matches!(err, ZtcError::Cancelled));

    assert!(!ctx_path.exists(), "context file must be removed once the stage is cancelled");

    let cache = StageCache::load(&workspace.stage_cache_path()).unwrap();
    assert!(
        !cache.is_cached_success("long-stage"),
        "a cancelled stage must never be recorded as a cache hit"
    );
}

#[tokio::test]
async fn pre_cancelled_token_stops_the_pipeline_before_any_stage_runs() {
    let platform = create_platform();
    let workspace = SecureWorkspace::create(platform.as_ref(), false).unwrap();

    let pipeline_stage = PipelineStage {
        name: "never-runs".to_string(),
        adapter: "test-adapter".to_string(),
        bucket: StageBucket::Bootstrap,
        description: "should never execute".to_string(),
        script: ScriptReference::new("test-adapter", "never-runs.sh", json!({})),
        cache_key: Some("never-runs".to_string()),
        barrier: Barrier::None,
        retry_policy: RetryPolicy {
            max_attempts: 1,
            base_backoff: Duration::from_millis(1),
        },
    };

    let stage_script = StageScript {
        stage: "never-runs".to_string(),
        adapter: "test-adapter".to_string(),
        relative_path: PathBuf::from("never-runs.sh"),
        contents: b"#!/bin/sh\nexit 0\n",
    };

    let manifest = ScriptExtractor::extract(&workspace, platform.as_ref(), &[stage_script]).unwrap();
    let probe = AlwaysReadyProbe;

    let coordinator = ShutdownCoordinator::default();
    coordinator.initiate_shutdown();

    let executor = BootstrapExecutor::new(&workspace, platform.as_ref(), &probe, &manifest, coordinator.token(), false);
    let err = executor.run(&[pipeline_stage]).await.unwrap_err();
    assert!(matches!(err, ZtcError::Cancelled));

    let cache = StageCache::load(&workspace.stage_cache_path()).unwrap();
    assert!(!cache.is_cached_success("never-runs"));
}
