//! Status and participants command implementation

use anyhow::Result;
use std::path::Path;
use tokio::runtime::Handle;

use memedrop::service::AirdropService;

/// Show the airdrop session of one wallet
pub fn status_command(config_path: Option<&Path>, wallet: &str) -> Result<()> {
    let (config, store) = super::open(config_path)?;
    let service = AirdropService::new(config, store, Handle::current())?;
    let view = service.session(wallet)?;

    println!("Wallet: {}", view.wallet);
    println!(
        "Email:  {} ({})",
        view.email.as_deref().unwrap_or("-"),
        if view.email_verified { "verified" } else { "unverified" }
    );
    println!(
        "Tasks:  {}/{} ({}%), {} tokens earned\n",
        view.progress.completed,
        view.progress.total,
        view.progress.rounded_percentage,
        view.total_reward_earned
    );

    for task in &view.tasks {
        println!(
            "  [{}] {} (+{}) - {}",
            if task.completed { "x" } else { " " },
            task.title,
            task.reward,
            task.link
        );
    }

    println!();
    println!("Phase:  {}", view.phase);
    println!("Status: {}", view.status_message);
    if view.claim.claimed {
        println!("Claimed: {} tokens", view.claim.claimed_token_amount);
    }

    Ok(())
}

/// Show participant totals, optionally listing every participant
pub fn participants_command(config_path: Option<&Path>, all: bool) -> Result<()> {
    let (config, store) = super::open(config_path)?;
    let service = AirdropService::new(config, store, Handle::current())?;
    let (summary, participants) = service.participants()?;

    println!(
        "Participants: {} ({} verified, {} claimed, {} tokens)",
        summary.total, summary.verified, summary.claimed, summary.tokens_claimed
    );

    if all {
        println!();
        for p in participants {
            println!(
                "  {} {} tasks={} {}",
                p.wallet_address,
                p.email.as_deref().unwrap_or("-"),
                p.snapshot.completed_tasks.len(),
                if p.snapshot.claimed { "claimed" } else { "" }
            );
        }
    }

    Ok(())
}
