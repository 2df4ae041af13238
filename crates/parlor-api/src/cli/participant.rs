//! Roster listing command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use console::style;

use parlor_types::participant::{Participant, stale_cutoff};

use crate::state::AppState;

/// List everyone in the room, in join order.
pub async fn list_participants(state: &AppState, json: bool) -> Result<()> {
    let participants = state.presence.list_participants().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&participants)?);
        return Ok(());
    }

    if participants.is_empty() {
        println!();
        println!("  {} The room is empty.", style("○").dim());
        println!();
        return Ok(());
    }

    let cutoff = stale_cutoff(chrono::Utc::now(), state.config.reaper.stale_after());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(Color::White),
            Cell::new("Last seen").fg(Color::White),
            Cell::new("Presence").fg(Color::White),
        ]);

    for p in &participants {
        let presence = if is_idle(p, cutoff) {
            Cell::new("idle").fg(Color::Yellow)
        } else {
            Cell::new("online").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&p.name).fg(Color::Cyan),
            Cell::new(format_relative_time(&p.last_seen_at)).fg(Color::DarkGrey),
            presence,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} participant{}",
        style(participants.len()).bold(),
        if participants.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Past the reaper's threshold. Nobody is idle under an unrepresentable one.
fn is_idle(participant: &Participant, cutoff: Option<chrono::DateTime<chrono::Utc>>) -> bool {
    cutoff.is_some_and(|cutoff| participant.is_stale(cutoff))
}

/// Seconds-resolution relative time; presence windows are short.
fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let diff = chrono::Utc::now() - *dt;

    if diff.num_seconds() < 1 {
        "just now".to_string()
    } else if diff.num_minutes() < 1 {
        format!("{}s ago", diff.num_seconds())
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else {
        format!("{}h ago", diff.num_hours())
    }
}
