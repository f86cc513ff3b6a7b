//! Supersede CLI: keeps supersedes / superseded_by pairs consistent.
//!
//! Usage:
//!   supersede sync [--vault dir] [FILES...] [--confirm | --no-confirm]
//!   supersede settings <show | set> [--settings path]

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use supersede::{
    Confirmation, ConfirmationPrompt, DocumentId, FsVault, Notifier, SkipReason, SyncOrchestrator,
    SyncOutcome, SyncSettings, SyncSignal,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "supersede",
    version,
    about = "Keep supersedes / superseded_by links consistent across a markdown vault"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate supersedes links from the given documents (or every document)
    Sync {
        /// Vault root directory
        #[arg(long, default_value = ".")]
        vault: PathBuf,
        /// Documents whose supersedes property changed
        files: Vec<PathBuf>,
        /// Ask before each update
        #[arg(long, conflicts_with = "no_confirm")]
        confirm: bool,
        /// Never ask, regardless of settings
        #[arg(long)]
        no_confirm: bool,
        /// Path to settings file
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
        /// Path to settings file
        #[arg(long, global = true)]
        settings: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Change settings
    Set {
        /// Turn synchronization on or off
        #[arg(long)]
        enabled: Option<bool>,
        /// Ask before updating a target document
        #[arg(long)]
        confirm_before_update: Option<bool>,
    },
}

/// Prints signals to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, signal: &SyncSignal) {
        eprintln!("{}", signal);
    }
}

/// Asks on the terminal. `y`/`yes` confirms, end of input dismisses,
/// anything else declines.
struct StdinPrompt;

#[async_trait]
impl ConfirmationPrompt for StdinPrompt {
    async fn confirm(&self, signal: &SyncSignal) -> Confirmation {
        let question = signal.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            eprint!("{} [y/N] ", question);
            std::io::stderr().flush().ok();
            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line),
            }
        })
        .await
        .ok()
        .flatten();

        match answer {
            None => Confirmation::Dismissed,
            Some(line) => match line.trim().to_lowercase().as_str() {
                "y" | "yes" => Confirmation::Accepted,
                _ => Confirmation::Declined,
            },
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: &Path) -> Result<SyncSettings, String> {
    SyncSettings::load(path).map_err(|e| format!("Failed to load settings from {}: {}", path.display(), e))
}

async fn cmd_sync(
    vault: &Path,
    files: &[PathBuf],
    confirm: Option<bool>,
    settings_path: &Path,
) -> i32 {
    let mut settings = match load_settings(settings_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some(confirm) = confirm {
        settings.confirm_before_update = confirm;
    }
    if !settings.enabled {
        eprintln!("Synchronization is disabled (see `supersede settings set --enabled true`)");
        return 0;
    }

    let vault = match FsVault::open(vault) {
        Ok(v) => Arc::new(v),
        Err(e) => {
            eprintln!("Error: cannot open vault '{}': {}", vault.display(), e);
            return 1;
        }
    };

    let sources: Vec<DocumentId> = if files.is_empty() {
        vault.documents()
    } else {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            match vault.id_for_path(file) {
                Ok(id) => ids.push(id),
                Err(e) => {
                    eprintln!("Error: '{}' is not a document in the vault: {}", file.display(), e);
                    return 1;
                }
            }
        }
        ids
    };

    let orchestrator = Arc::new(
        SyncOrchestrator::for_vault(vault, Arc::new(ConsoleNotifier))
            .with_prompt(Arc::new(StdinPrompt))
            .with_settings(Arc::new(settings)),
    );

    // Prompts would interleave on the terminal, so confirmations run one
    // document at a time.
    let results = if settings.confirm_before_update {
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            let outcome = orchestrator.handle_change(&source).await;
            results.push((source, outcome));
        }
        results
    } else {
        orchestrator.handle_changes(sources).await
    };

    let mut code = 0;
    let mut applied = 0;
    for (source, result) in &results {
        match result {
            Ok(SyncOutcome::Skipped(SkipReason::NoForwardLink)) => {}
            Ok(outcome) => {
                if outcome.is_applied() {
                    applied += 1;
                }
                println!("{:<40}  {}", source.to_string(), outcome);
            }
            Err(e) => {
                eprintln!("Error: {}: {}", source, e);
                code = 1;
            }
        }
    }
    println!("{} document(s) checked, {} updated", results.len(), applied);
    code
}

fn cmd_settings_show(path: &Path) -> i32 {
    match load_settings(path) {
        Ok(settings) => {
            println!("settings file:          {}", path.display());
            println!("enabled:                {}", settings.enabled);
            println!("confirm before update:  {}", settings.confirm_before_update);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_settings_set(path: &Path, enabled: Option<bool>, confirm_before_update: Option<bool>) -> i32 {
    let mut settings = match load_settings(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some(enabled) = enabled {
        settings.enabled = enabled;
    }
    if let Some(confirm) = confirm_before_update {
        settings.confirm_before_update = confirm;
    }
    match settings.save(path) {
        Ok(()) => {
            println!("Saved settings to {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Sync {
            vault,
            files,
            confirm,
            no_confirm,
            settings,
        } => {
            let settings_path = settings.unwrap_or_else(SyncSettings::default_path);
            let confirm = match (confirm, no_confirm) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            cmd_sync(&vault, &files, confirm, &settings_path).await
        }
        Commands::Settings { action, settings } => {
            let settings_path = settings.unwrap_or_else(SyncSettings::default_path);
            match action {
                SettingsAction::Show => cmd_settings_show(&settings_path),
                SettingsAction::Set {
                    enabled,
                    confirm_before_update,
                } => cmd_settings_set(&settings_path, enabled, confirm_before_update),
            }
        }
    };
    std::process::exit(code);
}
