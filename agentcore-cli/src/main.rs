//! agentcore CLI: chat with the agent, or inspect and seed its long-term memory. Config from env.

use agentcore_cli::{
    init_tracing, load_seed_file, Agent, AgentProfile, Cli, Commands, TemplateResponder,
};
use anyhow::{Context, Result};
use clap::Parser;
use embedding::EnvEmbeddingConfig;
use memory::{embedding_service_from_config, EnvMemoryConfig, MemoryManager, Tags};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const CONTENT_PREVIEW_LEN: usize = 80;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_file = std::env::var("AGENTCORE_LOG_FILE").unwrap_or_else(|_| "agentcore.log".to_string());
    let console = !matches!(cli.command, Commands::Chat { .. });
    init_tracing(&log_file, console).context("Initialise logging (check AGENTCORE_LOG_FILE)")?;

    let memory = Arc::new(open_memory().await?);

    match cli.command {
        Commands::Chat { seed } => handle_chat(memory, seed.as_deref()).await,
        Commands::Remember {
            content,
            category,
            importance,
        } => {
            let id = memory
                .remember(&content, &category, importance, Tags::new())
                .await
                .context("Insert memory")?;
            println!("Stored {}", id);
            Ok(())
        }
        Commands::Recall { query, k, category } => handle_recall(&memory, &query, k, category.as_deref()).await,
        Commands::List { limit } => handle_list(&memory, limit).await,
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&memory.stats().await)?);
            Ok(())
        }
        Commands::Seed { file } => {
            let seeds = load_seed_file(&file)?;
            let agent = agent(memory);
            let count = agent.seed(&seeds).await.context("Insert seed memories")?;
            println!("Inserted {} memories from {}", count, file.display());
            Ok(())
        }
    }
}

/// Builds the memory facade from env: EMBEDDING_*, STM_MAX_TOKENS, LTM_COLLECTION_NAME, MEMORY_*.
async fn open_memory() -> Result<MemoryManager> {
    let embedding_config = EnvEmbeddingConfig::from_env()
        .context("Load embedding config from .env (EMBEDDING_PROVIDER, EMBEDDING_DIM, OPENAI_API_KEY)")?;
    let embedder = embedding_service_from_config(&embedding_config)?;
    let memory_config = EnvMemoryConfig::from_env()
        .context("Load memory config from .env (STM_MAX_TOKENS, LTM_COLLECTION_NAME, MEMORY_STORE_TYPE)")?;
    let manager = MemoryManager::from_config(&memory_config, embedder)
        .await
        .context("Open long-term memory store")?;
    Ok(manager)
}

fn agent(memory: Arc<MemoryManager>) -> Agent {
    Agent::new(
        memory,
        Arc::new(TemplateResponder::default()),
        AgentProfile::default(),
    )
}

async fn handle_recall(memory: &MemoryManager, query: &str, k: usize, category: Option<&str>) -> Result<()> {
    let hits = match category {
        Some(c) => memory.recall_in(query, k, c).await,
        None => memory.recall(query, k).await,
    }
    .context("Query long-term memory")?;

    if hits.is_empty() {
        println!("No memories found.");
        return Ok(());
    }
    for hit in &hits {
        println!(
            "{:>8.4}  [{}] {}",
            hit.distance, hit.record.category, hit.record.content
        );
    }
    Ok(())
}

fn preview(content: &str) -> String {
    let cut = content
        .char_indices()
        .nth(CONTENT_PREVIEW_LEN)
        .map(|(i, _)| i)
        .unwrap_or(content.len());
    content[..cut].replace('\n', " ")
}

async fn handle_list(memory: &MemoryManager, limit: usize) -> Result<()> {
    let records = memory.list(limit).await.context("List long-term memory")?;
    if records.is_empty() {
        println!("No records.");
        return Ok(());
    }

    println!(
        "{:<32} {:<20} {:<16} {:<4} {}",
        "id", "created_at", "category", "imp", "content_preview"
    );
    println!("{}", "-".repeat(120));
    for r in &records {
        println!(
            "{:<32} {:<20} {:<16} {:<4} {}",
            r.id,
            r.created_at.format("%Y-%m-%d %H:%M:%S"),
            r.category,
            r.importance,
            preview(&r.content)
        );
    }
    Ok(())
}

async fn handle_chat(memory: Arc<MemoryManager>, seed: Option<&Path>) -> Result<()> {
    let agent = agent(memory);
    if let Some(path) = seed {
        let seeds = load_seed_file(path)?;
        let inserted = agent.seed_if_empty(&seeds).await.context("Seed long-term memory")?;
        if inserted > 0 {
            println!("Seeded {} core memories.", inserted);
        }
    }

    let name = agent.profile().name.clone();
    println!("{}\n", agent.profile().greeting);
    println!("Commands: 'stats' | 'reset' | '/remember <text>' | 'quit'\n");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "bye" => {
                println!("\n{}: Farewell, friend. May honor guide your path.", name);
                break;
            }
            "stats" => {
                let stats = agent.memory().stats().await;
                println!(
                    "\nShort-term: {} messages ({}/{} tokens)\nLong-term: {} memories\n",
                    stats.stm_message_count,
                    stats.stm_token_count,
                    stats.stm_capacity,
                    stats.ltm_record_count
                );
                continue;
            }
            "reset" => {
                agent.memory().clear().await;
                println!("\nShort-term memory cleared.\n");
                continue;
            }
            _ => {}
        }

        if let Some(text) = input.strip_prefix("/remember ") {
            match agent.remember_turn(text.trim()).await {
                Ok(Some(id)) => println!("\nRemembered as {}\n", id),
                Ok(None) => println!("\nNot stored.\n"),
                Err(e) => println!("\nError: {}\n", e),
            }
            continue;
        }

        match agent.process_message(input).await {
            Ok(reply) => println!("\n{}: {}\n", name, reply),
            Err(e) => println!("\nError: {}\nPlease try again.\n", e),
        }
    }
    Ok(())
}
