//! One-shot reaper cycle.

use anyhow::{Result, bail};
use console::style;

use parlor_core::reaper::CycleOutcome;

use crate::state::AppState;

/// Evict stale participants now, without waiting for the ticker.
pub async fn reap(state: &AppState, json: bool) -> Result<()> {
    let outcome = state.reaper.run_cycle().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        CycleOutcome::Completed(report) => {
            println!();
            println!(
                "  {} Scanned {}, evicted {}",
                style("✓").green().bold(),
                report.scanned,
                style(report.evicted.len()).bold()
            );
            for name in &report.evicted {
                println!("    {} {}", style("-").dim(), name);
            }
            for name in &report.failed {
                println!("    {} {} (will retry)", style("✗").red(), name);
            }
            println!();
            Ok(())
        }
        CycleOutcome::Skipped => {
            println!("  {} Another cycle is already running.", style("○").dim());
            Ok(())
        }
        CycleOutcome::Aborted { reason } => bail!("reaper cycle aborted: {reason}"),
    }
}
