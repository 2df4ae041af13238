//! Message log viewer.

use anyhow::Result;
use console::style;

use parlor_types::message::{ChatMessage, MessageKind};

use crate::state::AppState;

/// Print the messages `user` is allowed to see, oldest first.
pub async fn list_messages(
    state: &AppState,
    user: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let messages = state.messages.list_visible_to(user, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    println!();
    if messages.is_empty() {
        println!("  {} Nothing to show for '{}'.", style("○").dim(), user);
    }
    for message in &messages {
        println!("  {}", render(message));
    }
    println!();

    Ok(())
}

fn render(message: &ChatMessage) -> String {
    let time = style(format!("({})", message.time)).dim();
    match message.kind {
        MessageKind::Status => format!(
            "{time} {} {}",
            style(&message.from).bold(),
            style(&message.text).dim()
        ),
        MessageKind::Message => format!(
            "{time} {} para {}: {}",
            style(&message.from).cyan().bold(),
            style(&message.to).cyan(),
            message.text
        ),
        MessageKind::PrivateMessage => format!(
            "{time} {} reservadamente para {}: {}",
            style(&message.from).magenta().bold(),
            style(&message.to).magenta(),
            message.text
        ),
    }
}
