//! Command-line interface.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};

use crate::adapters::leetcode::LeetCodeClient;
use crate::adapters::notify::LogNotifier;
use crate::adapters::openai::OpenAiSuggester;
use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator, SqliteProgressStore};
use crate::domain::errors::DomainError;
use crate::domain::models::{Config, RULES};
use crate::domain::ports::{ActivitySource, ProgressStore};
use crate::services::{achievements, AccountService, Reconciler, SuggestionService};

#[derive(Parser)]
#[command(name = "leettrack", version, about = "LeetCode practice tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and apply migrations
    Init,
    /// Link a handle to a LeetCode username
    Register { handle: String, username: String },
    /// Generate and assign up to three suggested problems
    Suggest { handle: String },
    /// Show assigned tasks and completion totals
    Progress { handle: String },
    /// Show achievement progress and unlocks
    Achievements { handle: String },
    /// Run the background reconciliation loop
    Run,
}

async fn open_store(config: &Config) -> Result<Arc<dyn ProgressStore>> {
    let pool = create_pool(&config.database)
        .await
        .context("failed to open database")?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("failed to run migrations")?;
    Ok(Arc::new(SqliteProgressStore::new(pool)))
}

fn activity_source(config: &Config) -> Result<Arc<dyn ActivitySource>> {
    Ok(Arc::new(LeetCodeClient::new(&config.leetcode)?))
}

pub async fn execute(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Init => init(&config).await,
        Commands::Register { handle, username } => register(&config, &handle, &username).await,
        Commands::Suggest { handle } => suggest(&config, &handle).await,
        Commands::Progress { handle } => progress(&config, &handle).await,
        Commands::Achievements { handle } => achievements_cmd(&config, &handle).await,
        Commands::Run => run(config).await,
    }
}

async fn init(config: &Config) -> Result<()> {
    let pool = create_pool(&config.database)
        .await
        .context("failed to open database")?;
    let applied = Migrator::new(pool)
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("failed to run migrations")?;
    println!(
        "Database ready at {} ({applied} migration(s) applied)",
        config.database.path
    );
    Ok(())
}

async fn register(config: &Config, handle: &str, username: &str) -> Result<()> {
    let store = open_store(config).await?;
    let activity = activity_source(config)?;
    let accounts = AccountService::new(store, activity);

    match accounts.register(handle, username).await {
        Ok(profile) => {
            println!("Connected {handle} to LeetCode as {}", profile.username);
            println!(
                "Solved so far: {} total ({} Easy / {} Medium / {} Hard)",
                profile.stats.total, profile.stats.easy, profile.stats.medium, profile.stats.hard
            );
            Ok(())
        }
        Err(DomainError::ProfileNotFound(name)) => {
            println!("Username '{name}' not found on LeetCode.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn suggest(config: &Config, handle: &str) -> Result<()> {
    let store = open_store(config).await?;
    let activity = activity_source(config)?;
    let suggester = Arc::new(OpenAiSuggester::new(config.openai.clone())?);
    let service = SuggestionService::new(store, activity, suggester);

    match service.suggest_for(handle).await {
        Ok(outcome) => {
            if !outcome.analysis.is_empty() {
                println!("Analysis: {}\n", outcome.analysis);
            }
            if outcome.accepted.is_empty() {
                println!("No usable suggestions this round. Try again later.");
                return Ok(());
            }
            for (i, task) in outcome.accepted.iter().enumerate() {
                println!(
                    "{}. {} [{}] {} -> https://leetcode.com/problems/{}/",
                    i + 1,
                    task.slug,
                    task.difficulty.as_str(),
                    task.category,
                    task.slug
                );
            }
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            println!("{err}. Register first with `leettrack register`.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn progress(config: &Config, handle: &str) -> Result<()> {
    let store = open_store(config).await?;
    let user = store
        .get_user(handle)
        .await?
        .ok_or_else(|| DomainError::UserNotFound(handle.to_string()))?;

    let pending = store.list_pending(user.id).await?;
    let completed = store.list_completed(user.id).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Problem", "Difficulty", "Category", "Status"]);
    for task in pending.iter().chain(completed.iter()) {
        table.add_row(vec![
            task.slug.clone(),
            task.difficulty.as_str().to_string(),
            task.category.clone(),
            if task.is_pending() {
                "pending".to_string()
            } else {
                "completed".to_string()
            },
        ]);
    }
    println!("{table}");
    println!(
        "{} completed, {} pending",
        completed.len(),
        pending.len()
    );
    Ok(())
}

async fn achievements_cmd(config: &Config, handle: &str) -> Result<()> {
    let store = open_store(config).await?;
    let user = store
        .get_user(handle)
        .await?
        .ok_or_else(|| DomainError::UserNotFound(handle.to_string()))?;

    let by_category = store.aggregate_by_category(user.id).await?;
    let by_difficulty = store.aggregate_by_difficulty(user.id).await?;
    let total = store.total_completed(user.id).await?;
    let unlocked: Vec<String> = store
        .list_achievements(user.id)
        .await?
        .into_iter()
        .map(|a| a.rule_key)
        .collect();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Achievement", "Progress", "Status"]);
    for rule in RULES {
        let progress = achievements::progress_for(rule, &by_category, &by_difficulty, total);
        table.add_row(vec![
            rule.name.to_string(),
            format!("{}/{}", progress.min(rule.required), rule.required),
            if unlocked.iter().any(|k| k == rule.key) {
                "unlocked 🏆".to_string()
            } else {
                "locked".to_string()
            },
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn run(config: Config) -> Result<()> {
    let store = open_store(&config).await?;
    let activity = activity_source(&config)?;
    let notifier = Arc::new(LogNotifier);

    let reconciler = Reconciler::new(store, activity, notifier, config.tracker.clone());
    let handle = reconciler.handle();

    // Run the loop on its own task so a signal never cancels it mid-step;
    // stop() is observed at the loop's sleep point and the join below lets
    // any in-flight completion finish before we exit.
    let mut loop_task = tokio::spawn(reconciler.run());
    tokio::select! {
        joined = &mut loop_task => {
            joined?;
            return Ok(());
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            handle.stop();
        }
    }
    loop_task.await?;
    Ok(())
}
