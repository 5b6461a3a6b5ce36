//! epigram - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use git2::Repository;

use epigram::cache::ResponseCache;
use epigram::config::{Config, default_state_dir};
use epigram::context::AppContext;
use epigram::git::{collect_staged_diff, commit_staged};
use epigram::hooks::{
    HookOrchestrator, HookStage, HookStatus, hook_status, install_hooks, uninstall_hooks,
};
use epigram::pipeline::MessagePipeline;
use epigram::provider::{GenerationRequest, ProviderKind};

/// Generate commit messages from staged changes using AI.
#[derive(Parser, Debug)]
#[command(name = "epigram")]
#[command(about = "Generate commit messages from staged changes using AI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// AI backend to use (openai, gemini, ollama)
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Explicit model override (defaults to the provider's default model)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature, 0.0-1.0
    #[arg(long, value_parser = parse_temperature)]
    temperature: Option<f32>,

    /// Maximum output length in tokens
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_tokens: Option<u32>,

    /// Print the generated message without committing
    #[arg(long)]
    preview: bool,

    /// Commit without asking for confirmation
    #[arg(long)]
    auto: bool,

    /// Skip the response cache for this invocation
    #[arg(long)]
    no_cache: bool,

    /// Show cache statistics and exit without generating
    #[arg(long)]
    cache_stats: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage git hooks
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum HookAction {
    /// Install hook shims into .git/hooks (all stages when none given)
    Install { stages: Vec<HookStage> },
    /// Remove hook shims, restoring any backed-up hooks
    Uninstall { stages: Vec<HookStage> },
    /// Show installation status per hook
    Status,
    /// Run one lifecycle stage (invoked by the installed shims)
    Run {
        stage: HookStage,
        /// Path to the commit message file (commit-msg stage only)
        message_file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry counts and age
    Stats,
    /// Delete expired entries (or everything with --all)
    Purge {
        #[arg(long)]
        all: bool,
    },
}

fn parse_temperature(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("temperature must be between 0.0 and 1.0, got {value}"))
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "epigram=debug" } else { "epigram=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let state_dir = default_state_dir().context("Could not locate the state directory")?;
    let config = Config::load(&state_dir).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Hook { ref action }) => run_hook_command(action, config, state_dir).await,
        Some(Command::Cache { ref action }) => run_cache_command(action, config, state_dir).await,
        None => run_generate(cli, config, state_dir).await,
    }
}

async fn run_generate(cli: Cli, mut config: Config, state_dir: PathBuf) -> Result<()> {
    if cli.no_cache {
        config.cache_enabled = false;
    }
    let provider = cli.provider.unwrap_or(config.provider);
    let model = cli.model.clone().or_else(|| config.model.clone());
    let temperature = cli.temperature.unwrap_or(config.temperature);
    let max_tokens = cli.max_tokens.unwrap_or(config.max_tokens);
    let preview = cli.preview || config.preview_mode;

    // Step 0: cache-stats query mode exits without generating anything.
    if cli.cache_stats {
        let ctx = AppContext::new(config, state_dir);
        let cache = ResponseCache::open(&ctx.cache_db_path(), ctx.cache_max_age())
            .await
            .context("Failed to open the response cache")?;
        print_cache_stats(&cache).await?;
        return Ok(());
    }

    let ctx = AppContext::new(config, state_dir).with_cache().await;

    // Step 1: read the staged changes.
    let repo = Repository::discover(".")
        .context("Not a git repository. Run epigram from within a git repository.")?;
    let payload = collect_staged_diff(&repo).context("Failed to read staged changes")?;

    println!(
        "Analyzing {} staged file(s) ({} additions, {} deletions)...",
        payload.changed_files.len(),
        payload.additions,
        payload.deletions
    );

    // Step 2: generate (cache consulted first, provider on miss).
    let request = GenerationRequest::new(provider, model, temperature, max_tokens);
    println!("Generating commit message with {}...", request.provider);

    let message = MessagePipeline::new(&ctx)
        .generate(&payload, &request)
        .await?;

    println!("\n  {message}\n");

    // Step 3: commit, unless this is a preview.
    if preview {
        println!("Preview mode - no commit was made.");
        return Ok(());
    }

    if !cli.auto {
        let proceed = dialoguer::Confirm::new()
            .with_prompt("Commit with this message?")
            .default(true)
            .interact()
            .context("Confirmation prompt failed")?;
        if !proceed {
            println!("Aborted - no commit was made.");
            return Ok(());
        }
    }

    let oid = commit_staged(&repo, &message).context("Failed to create commit")?;
    println!("✓ Committed {}", &oid.to_string()[..7]);

    Ok(())
}

async fn run_hook_command(action: &HookAction, config: Config, state_dir: PathBuf) -> Result<()> {
    match action {
        HookAction::Install { stages } => {
            let repo = Repository::discover(".")
                .context("Not a git repository. Run epigram from within a git repository.")?;
            install_hooks(&repo, stages)?;
            println!("Hooks installed.");
            Ok(())
        }
        HookAction::Uninstall { stages } => {
            let repo = Repository::discover(".")
                .context("Not a git repository. Run epigram from within a git repository.")?;
            uninstall_hooks(&repo, stages)?;
            println!("Hooks removed.");
            Ok(())
        }
        HookAction::Status => {
            let repo = Repository::discover(".")
                .context("Not a git repository. Run epigram from within a git repository.")?;
            for (stage, status) in hook_status(&repo) {
                let label = match status {
                    HookStatus::Installed => "installed",
                    HookStatus::NotInstalled => "not installed",
                    HookStatus::Foreign => "foreign hook present",
                };
                println!("{:<12} {}", stage.hook_name(), label);
            }
            Ok(())
        }
        HookAction::Run {
            stage,
            message_file,
        } => {
            // The hook surface must never fail the surrounding commit:
            // the outcome's exit code is 0 no matter what happened inside.
            let ctx = AppContext::new(config, state_dir).with_cache().await;
            let orchestrator = HookOrchestrator::new(&ctx);
            let outcome = orchestrator.run(*stage, message_file.as_deref()).await;
            std::process::exit(outcome.exit_code());
        }
    }
}

async fn run_cache_command(action: &CacheAction, config: Config, state_dir: PathBuf) -> Result<()> {
    let ctx = AppContext::new(config, state_dir);
    let cache = ResponseCache::open(&ctx.cache_db_path(), ctx.cache_max_age())
        .await
        .context("Failed to open the response cache")?;

    match action {
        CacheAction::Stats => print_cache_stats(&cache).await,
        CacheAction::Purge { all } => {
            let removed = if *all {
                cache.purge_all().await?
            } else {
                cache.purge_expired().await?
            };
            println!("Removed {removed} cache entries.");
            Ok(())
        }
    }
}

async fn print_cache_stats(cache: &ResponseCache) -> Result<()> {
    let stats = cache.statistics().await?;

    println!("Cache statistics:");
    println!("  Total entries: {}", stats.total_entries);
    if !stats.per_provider.is_empty() {
        println!("  By provider:");
        for (provider, count) in &stats.per_provider {
            println!("    - {provider}: {count}");
        }
    }
    if let Some(oldest) = stats.oldest_entry {
        println!("  Oldest entry: {}", oldest.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
