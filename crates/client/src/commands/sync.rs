// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::Context;
use crate::error::Result;
use crate::sync::PassOutcome;

pub async fn run(ctx: &Context) -> Result<()> {
    ctx.check_connectivity().await;
    let outcome = ctx.scheduler.run_pass().await;
    println!("{}", describe(&outcome));
    Ok(())
}

pub(crate) fn describe(outcome: &PassOutcome) -> String {
    match outcome {
        PassOutcome::Completed(report) if report.is_empty() => "nothing to sync".to_string(),
        PassOutcome::Completed(report) => format!(
            "synced {}, retrying {}, dead-lettered {}",
            report.synced.len(),
            report.retried.len(),
            report.dead_lettered.len()
        ),
        PassOutcome::Offline => "offline: nothing sent".to_string(),
        PassOutcome::AlreadyRunning => "a sync pass is already running".to_string(),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
