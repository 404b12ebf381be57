//! `tripchat ask` -- run one message through the chat pipeline.

use console::style;

use tripchat_types::chat::{ChatReply, ContentOutcome};

use crate::state::AppState;

/// Send `message` for `session_id` and print the reply.
///
/// Sessions live in memory, so each invocation starts a fresh conversation.
pub async fn ask(state: &AppState, session_id: &str, message: &str, json: bool) -> anyhow::Result<()> {
    let reply = match state.orchestrator.handle(session_id, message).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "ask failed");
            anyhow::bail!("{}", e.user_message());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    print_reply(&reply);
    Ok(())
}

fn print_reply(reply: &ChatReply) {
    println!();
    println!("  {}", reply.reply);

    match reply.content {
        ContentOutcome::NotRequested => {}
        ContentOutcome::Found => {
            println!();
            println!(
                "  {}",
                style(format!("── {} matching posts ──", reply.matched_content.len())).dim()
            );
            for item in &reply.matched_content {
                println!("  {} {}", style("•").cyan(), post_title(&item.0));
            }
        }
        ContentOutcome::NoMatches | ContentOutcome::Unavailable => {
            if let Some(msg) = &reply.content_message {
                println!();
                println!("  {}", style(msg).dim());
            }
        }
    }
    println!();
}

/// Best-effort one-line label for an opaque post.
fn post_title(item: &serde_json::Value) -> String {
    ["title", "name", "caption"]
        .iter()
        .find_map(|key| item.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| item.to_string())
}
