//! Interactive chat loop.
//!
//! Reads lines from stdin and sends each as a turn. Slash commands:
//! `/exit`, `/history`, `/system <new prompt or @file>`.

use std::io::Write;

use anyhow::Context;
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};

use parley_core::chat::Chatbot;
use parley_core::store::conversation::ConversationStore;
use parley_infra::llm::OpenAiClient;
use parley_types::chat::timestamp;
use parley_types::config::EngineConfig;
use parley_types::error::{ChatError, StoreError};

use crate::conversations::resolve_system_prompt;
use crate::store_select::AnyStore;

fn build_client(config: &EngineConfig) -> anyhow::Result<OpenAiClient> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; export it to chat")?;
    let mut client = OpenAiClient::new(SecretString::from(api_key));
    if let Some(base_url) = &config.provider_base_url {
        client = client.with_base_url(base_url.clone());
    }
    Ok(client)
}

pub async fn run(store: AnyStore, config: &EngineConfig, id: &str) -> anyhow::Result<()> {
    let conversation = match store.load(id).await {
        Ok(conversation) => conversation,
        Err(StoreError::NotFound) => {
            anyhow::bail!("conversation '{id}' does not exist; create it with `parley init {id}`")
        }
        Err(err) => return Err(err.into()),
    };
    println!(
        "Loaded conversation '{}' (model={}). Messages so far: {}",
        id,
        conversation.model,
        conversation.messages.len()
    );
    println!("Type your message and press Enter. Commands: /exit, /history, /system <new system prompt or @file>");

    let bot = Chatbot::new(store, build_client(config)?)
        .with_sampling(config.temperature, config.top_p);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            println!("\nExiting.");
            break;
        };
        let user_text = line.trim();
        if user_text.is_empty() {
            continue;
        }

        let command = user_text.to_lowercase();
        if matches!(command.as_str(), "/exit" | "/quit" | ":q") {
            break;
        }
        if command == "/history" {
            let conversation = bot.store().load(id).await?;
            let skip = conversation.messages.len().saturating_sub(20);
            for message in &conversation.messages[skip..] {
                println!(
                    "[{}] {}: {}",
                    message.timestamp.format(timestamp::FORMAT),
                    message.role.to_string().to_uppercase(),
                    message.content
                );
            }
            continue;
        }
        if let Some(rest) = user_text.strip_prefix("/system ") {
            let new_prompt = resolve_system_prompt(rest.trim())?;
            let mut conversation = bot.store().load(id).await?;
            conversation.system_prompt = new_prompt;
            bot.store().save(&conversation).await?;
            println!("System prompt updated.");
            continue;
        }

        match bot.send(id, user_text).await {
            Ok(reply) => println!("Assistant: {reply}\n"),
            Err(ChatError::Provider(err)) => {
                // The user's turn is already persisted; surface and continue.
                eprintln!("Provider error: {err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
