//! Conversation management commands: init, list, rename, delete,
//! preview, claim.

use anyhow::Context;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use futures_util::StreamExt;

use parley_core::share::ShareService;
use parley_core::store::conversation::ConversationStore;
use parley_types::chat::{timestamp, Conversation};
use parley_types::config::EngineConfig;

use crate::store_select::AnyStore;

/// Resolve `@path/to/file` system-prompt syntax.
pub fn resolve_system_prompt(raw: &str) -> anyhow::Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read system prompt from '{path}'")),
        None => Ok(raw.to_string()),
    }
}

pub async fn init(
    store: &AnyStore,
    config: &EngineConfig,
    id: &str,
    title: Option<&str>,
    model: Option<&str>,
    system: Option<&str>,
    owner: Option<&str>,
    overwrite: bool,
) -> anyhow::Result<()> {
    let system_prompt = match system {
        Some(raw) => resolve_system_prompt(raw)?,
        None => config.system_prompt.clone(),
    };
    let model = model.unwrap_or(&config.model);

    if overwrite && store.exists(id).await? {
        println!("Overwriting existing conversation '{id}'...");
        store.delete(id).await?;
    }

    // Title defaults to the id so the first user message auto-names it.
    let conversation = store
        .create(id, Some(title.unwrap_or(id)), model, &system_prompt, owner)
        .await?;
    println!(
        "Initialized conversation '{}' with model={}",
        conversation.conversation_id, conversation.model
    );
    Ok(())
}

fn summary_row(conversation: &Conversation) -> Vec<String> {
    vec![
        conversation.conversation_id.clone(),
        conversation.title.clone(),
        conversation.model.clone(),
        conversation.messages.len().to_string(),
        conversation
            .updated_at
            .format(timestamp::FORMAT)
            .to_string(),
    ]
}

pub async fn list(store: &AnyStore, owner: Option<&str>) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Id", "Title", "Model", "Messages", "Updated"]);

    match owner {
        Some(owner) => {
            let mut conversations = store.iter_owner(owner);
            while let Some(conversation) = conversations.next().await {
                table.add_row(summary_row(&conversation?));
            }
        }
        None => {
            for id in store.list_conversations(None).await? {
                table.add_row(summary_row(&store.load(&id).await?));
            }
        }
    }

    println!("{table}");
    Ok(())
}

pub async fn rename(store: &AnyStore, id: &str, title: &str) -> anyhow::Result<()> {
    let title = title.trim();
    anyhow::ensure!(!title.is_empty(), "title cannot be empty");

    let mut conversation = store.load(id).await?;
    if conversation.title != title {
        conversation.title = title.to_string();
        store.save(&conversation).await?;
    }
    println!("Renamed '{id}' to \"{title}\"");
    Ok(())
}

pub async fn delete(store: &AnyStore, id: &str) -> anyhow::Result<()> {
    store.delete(id).await?;
    println!("Deleted conversation '{id}'");
    Ok(())
}

pub async fn preview(store: AnyStore, id: &str) -> anyhow::Result<()> {
    let service = ShareService::new(store);
    let conversation = service.preview(id).await?;

    println!(
        "'{}' -- {} message(s), model={}, owner={}",
        conversation.title,
        conversation.messages.len(),
        conversation.model,
        conversation.owner.as_deref().unwrap_or("-"),
    );
    for message in conversation.messages.iter().rev().take(10).rev() {
        println!(
            "[{}] {}: {}",
            message.timestamp.format(timestamp::FORMAT),
            message.role.to_string().to_uppercase(),
            message.content
        );
    }
    Ok(())
}

pub async fn claim(store: AnyStore, id: &str, owner: &str) -> anyhow::Result<()> {
    let service = ShareService::new(store);
    let claimed = service.claim(id, owner).await?;
    if claimed.conversation_id == id {
        println!("'{id}' already belongs to {owner}; nothing to do");
    } else {
        println!(
            "Claimed '{}' as '{}' for {}",
            id, claimed.conversation_id, owner
        );
    }
    Ok(())
}
