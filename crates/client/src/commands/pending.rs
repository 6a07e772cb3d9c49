// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ferry_core::{OperationKind, PendingOperation};

use crate::cli::OutputFormat;
use crate::context::Context;
use crate::error::Result;

pub fn run(ctx: &Context, kind: Option<OperationKind>, output: OutputFormat) -> Result<()> {
    let ops = collect(ctx, kind);
    match output {
        OutputFormat::Text => {
            if ops.is_empty() {
                println!("nothing queued");
            }
            for op in &ops {
                println!("{}", format_line(op));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ops)?),
    }
    Ok(())
}

/// Queued operations in pass order: kinds in sync order, FIFO within a kind.
pub(crate) fn collect(ctx: &Context, kind: Option<OperationKind>) -> Vec<PendingOperation> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => OperationKind::ALL.to_vec(),
    };
    kinds.into_iter().flat_map(|kind| ctx.outbox.list(kind)).collect()
}

pub(crate) fn format_line(op: &PendingOperation) -> String {
    format!(
        "{}  {:<15}  {}  (attempts {}/{})",
        op.id,
        op.kind.as_str(),
        op.destination,
        op.retry_count,
        op.max_retries
    )
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
