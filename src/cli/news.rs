//! News command implementation

use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum NewsCommand {
    /// List news items, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Publish a news item
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        link: Option<String>,
    },

    /// Delete a news item by id
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub fn news_command(config_path: Option<&Path>, command: NewsCommand) -> Result<()> {
    let (_, store) = super::open(config_path)?;
    let news = store.news();

    match command {
        NewsCommand::List { limit } => {
            let items = news.list(limit)?;
            if items.is_empty() {
                println!("No news.");
                return Ok(());
            }
            for item in items {
                let published = Utc
                    .timestamp_millis_opt(item.published_at)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!("{} [{}] {}", item.id, published, item.title);
                println!("    {}", item.body);
                if let Some(link) = &item.link {
                    println!("    {}", link);
                }
            }
        }
        NewsCommand::Add { title, body, link } => {
            if title.trim().is_empty() || body.trim().is_empty() {
                bail!("Title and body must not be empty");
            }
            let item = news.insert(
                title.trim(),
                body.trim(),
                link.as_deref(),
                Utc::now().timestamp_millis(),
            )?;
            println!("Published: {}", item.id);
        }
        NewsCommand::Delete { id } => {
            if !news.delete(&id)? {
                bail!("No news item with id {}", id);
            }
            println!("Deleted: {}", id);
        }
    }

    Ok(())
}
