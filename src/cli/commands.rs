use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::HttpBackend;
use crate::board::{BoardController, BoardSnapshot, DeleteOutcome, DropError, TransitionOutcome};
use crate::cli::abbrev;
use crate::cli::error::{user_error, validate_entry_id, validate_target};
use crate::cli::output::{
    self, render_board, render_entry_detail, render_entry_list, render_stage_table,
    EntryListOptions,
};
use crate::cli::status::{compute_pipeline_status, compute_status_report};
use crate::config::Config;
use crate::context::RequestContext;
use crate::models::EntryKind;
use crate::utils::fuzzy;

#[derive(Parser)]
#[command(name = "ridgeline")]
#[command(about = "Ridgeline - command-line pipeline board for the Ridgeline roofing CRM")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the pipeline board
    Board {
        /// Show only this stage's column
        #[arg(long)]
        stage: Option<String>,
        /// Show only leads or only jobs
        #[arg(long)]
        kind: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List entries as a flat table
    List {
        /// Show only entries in this stage
        #[arg(long)]
        stage: Option<String>,
        /// Show only leads or only jobs
        #[arg(long)]
        kind: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Show Updated as relative time (e.g., "3 days ago")
        #[arg(long)]
        relative: bool,
    },
    /// Show one entry in detail
    Show {
        /// Entry id
        entry_id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Move an entry to another stage
    Move {
        /// Entry id
        entry_id: String,
        /// Stage key, or another entry's id to join its column
        target: String,
    },
    /// Delete an entry (the backend may refuse)
    Delete {
        /// Entry id
        entry_id: String,
        /// Delete without confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List the tenant's stages
    Stages {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a one-line pipeline summary
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub async fn run() -> Result<()> {
    // Make ANSI colors work in Windows terminals; harmless elsewhere
    let _ = enable_ansi_support::enable_ansi_support();

    // Get raw args
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // Check for version flag early (before any processing)
    if args.iter().any(|a| a == "--version" || a == "-V") {
        let cli = Cli::try_parse_from(std::env::args());
        match cli {
            Ok(_) => return Ok(()),
            Err(_e) => {
                // Clap signals version display through Err; print it ourselves
                println!("ridgeline {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
        }
    }

    // Expand command abbreviations before processing
    args = match abbrev::expand_command_abbreviations(args) {
        Ok(expanded) => expanded,
        Err(e) => {
            user_error(&e);
        }
    };

    // Check for help requests or empty args (before clap parsing)
    let is_help_request =
        args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h" || a == "help");
    if is_help_request {
        match Cli::try_parse() {
            Ok(_) => return Ok(()),
            Err(e) => {
                e.print()?;
                return Ok(());
            }
        }
    }

    // Use clap parsing with expanded args
    let clap_args = std::iter::once("ridgeline".to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>();
    let cli = match Cli::try_parse_from(clap_args) {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            std::process::exit(1);
        }
    };

    handle_command(cli).await
}

async fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Board { stage, kind, json } => handle_board(stage, kind, json).await,
        Commands::List {
            stage,
            kind,
            json,
            relative,
        } => handle_list(stage, kind, json, relative).await,
        Commands::Show { entry_id, json } => handle_show(entry_id, json).await,
        Commands::Move { entry_id, target } => handle_move(entry_id, target).await,
        Commands::Delete { entry_id, yes } => handle_delete(entry_id, yes).await,
        Commands::Stages { json } => handle_stages(json).await,
        Commands::Status { json } => handle_status(json).await,
    }
}

/// Build the controller and context from configuration
fn connect() -> Result<(BoardController, RequestContext)> {
    let config = Config::load()?;
    let backend = HttpBackend::from_config(&config)?;
    let ctx = config.context();
    Ok((BoardController::new(Arc::new(backend)), ctx))
}

/// Load a fresh board or die with a consistent message
async fn load_board() -> Result<(BoardController, RequestContext)> {
    let (controller, ctx) = connect()?;
    controller
        .load(&ctx)
        .await
        .context("Failed to load the pipeline board")?;
    Ok((controller, ctx))
}

fn parse_kind_filter(kind: Option<&str>) -> Option<EntryKind> {
    let kind = kind?;
    match EntryKind::from_str(kind) {
        Some(parsed) => Some(parsed),
        None => user_error(&format!(
            "Invalid kind '{}'. Valid kinds: lead, job",
            kind
        )),
    }
}

/// Error out on an unknown stage key, suggesting a close match if one exists
fn unknown_stage_error(key: &str, snapshot: &BoardSnapshot) -> ! {
    let keys: Vec<String> = snapshot
        .columns
        .iter()
        .map(|c| c.stage.key.clone())
        .collect();
    let mut message = format!(
        "Unknown stage '{}'. Valid stages: {}.",
        key,
        keys.join(", ")
    );
    if let Some(suggestion) = fuzzy::suggest_stage(key, &keys) {
        message.push_str(&format!(" Did you mean '{}'?", suggestion));
    }
    user_error(&message);
}

/// Narrow a snapshot to one stage and/or one entry kind
fn filter_snapshot(
    snapshot: BoardSnapshot,
    stage: Option<&str>,
    kind: Option<EntryKind>,
) -> BoardSnapshot {
    let mut snapshot = snapshot;

    if let Some(stage_key) = stage {
        if !snapshot.columns.iter().any(|c| c.stage.key == stage_key) {
            unknown_stage_error(stage_key, &snapshot);
        }
        snapshot.columns.retain(|c| c.stage.key == stage_key);
    }

    if let Some(kind) = kind {
        for column in &mut snapshot.columns {
            column.entries.retain(|e| e.entry_type == kind);
        }
    }

    snapshot
}

async fn handle_board(stage: Option<String>, kind: Option<String>, json: bool) -> Result<()> {
    let kind = parse_kind_filter(kind.as_deref());
    let (controller, _ctx) = load_board().await?;
    let snapshot = filter_snapshot(controller.snapshot(), stage.as_deref(), kind);

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "{}",
            render_board(&snapshot, output::get_terminal_width(), output::is_tty())
        );
    }
    Ok(())
}

async fn handle_list(
    stage: Option<String>,
    kind: Option<String>,
    json: bool,
    relative: bool,
) -> Result<()> {
    let kind = parse_kind_filter(kind.as_deref());
    let (controller, _ctx) = load_board().await?;
    let snapshot = filter_snapshot(controller.snapshot(), stage.as_deref(), kind);

    if json {
        let entries: Vec<_> = snapshot
            .columns
            .iter()
            .flat_map(|c| c.entries.iter())
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        let options = EntryListOptions {
            use_relative_time: relative,
        };
        println!("{}", render_entry_list(&snapshot, &options, output::is_tty()));
    }
    Ok(())
}

async fn handle_show(entry_id: String, json: bool) -> Result<()> {
    if let Err(e) = validate_entry_id(&entry_id) {
        user_error(&e);
    }

    let (controller, _ctx) = load_board().await?;
    let Some(entry) = controller.entry(&entry_id) else {
        user_error(&format!(
            "No entry '{}' on the board. Run 'ridgeline list' to see entries.",
            entry_id
        ));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let snapshot = controller.snapshot();
        let stage = snapshot
            .columns
            .iter()
            .map(|c| &c.stage)
            .find(|s| s.key == entry.status);
        println!("{}", render_entry_detail(&entry, stage, output::is_tty()));
    }
    Ok(())
}

async fn handle_move(entry_id: String, target: String) -> Result<()> {
    if let Err(e) = validate_entry_id(&entry_id) {
        user_error(&e);
    }
    if let Err(e) = validate_target(&target) {
        user_error(&e);
    }

    let (controller, ctx) = load_board().await?;

    if let Err(e) = controller.begin_drag(&entry_id) {
        match e {
            DropError::TransitionPending(id) => user_error(&format!(
                "Entry '{}' already has a transition in flight. Try again shortly.",
                id
            )),
            _ => user_error(&format!(
                "No entry '{}' on the board. Run 'ridgeline list' to see entries.",
                entry_id
            )),
        }
    }

    match controller.complete_drag(&ctx, &entry_id, &target).await {
        Err(DropError::UnknownTarget(t)) => {
            let snapshot = controller.snapshot();
            let keys: Vec<String> = snapshot
                .columns
                .iter()
                .map(|c| c.stage.key.clone())
                .collect();
            let mut message = format!(
                "'{}' is neither a stage key nor an entry on the board.",
                t
            );
            if let Some(suggestion) = fuzzy::suggest_stage(&t, &keys) {
                message.push_str(&format!(" Did you mean '{}'?", suggestion));
            }
            user_error(&message);
        }
        Err(DropError::UnknownEntry(id)) => {
            user_error(&format!("No entry '{}' on the board.", id))
        }
        Err(DropError::TransitionPending(id)) => user_error(&format!(
            "Entry '{}' already has a transition in flight. Try again shortly.",
            id
        )),
        Ok(TransitionOutcome::NoOp { stage }) => {
            println!("Entry {} is already in '{}'.", entry_id, stage);
        }
        Ok(TransitionOutcome::Accepted {
            request,
            message,
            refreshed,
        }) => {
            println!(
                "Moved {}: {} -> {}",
                request.entry_id, request.from_stage, request.to_stage
            );
            if !message.is_empty() {
                println!("{}", message);
            }
            if !refreshed {
                eprintln!(
                    "Warning: the move was recorded but the board could not be refreshed; run 'ridgeline board' to re-sync."
                );
            }
        }
        Ok(TransitionOutcome::Denied {
            request,
            reason,
            message,
            ..
        }) => {
            let detail = message.map(|m| format!(" ({})", m)).unwrap_or_default();
            user_error(&format!(
                "Move denied: {}{}. Entry {} stays in '{}'.",
                reason, detail, request.entry_id, request.from_stage
            ));
        }
        Ok(TransitionOutcome::Failed { request, error, .. }) => {
            use crate::cli::error::internal_error;
            internal_error(&format!(
                "transition request failed: {}. Entry {} stays in '{}'.",
                error, request.entry_id, request.from_stage
            ));
        }
    }
    Ok(())
}

async fn handle_delete(entry_id: String, yes: bool) -> Result<()> {
    use std::io::{self, Write};

    if let Err(e) = validate_entry_id(&entry_id) {
        user_error(&e);
    }

    let (controller, ctx) = load_board().await?;
    let Some(entry) = controller.entry(&entry_id) else {
        user_error(&format!("No entry '{}' on the board.", entry_id));
    };

    if !yes {
        print!(
            "Delete {} {} ({})? (y/n): ",
            entry.entry_type.as_str(),
            entry.display_title(),
            entry.id
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match controller.remove_entry(&ctx, &entry_id).await {
        Err(DropError::TransitionPending(id)) => user_error(&format!(
            "Entry '{}' still has a transition in flight. Try again shortly.",
            id
        )),
        Err(e) => user_error(&e.to_string()),
        Ok(DeleteOutcome::Removed { entry_id, message }) => {
            println!("Deleted {} {}.", entry.entry_type.as_str(), entry_id);
            if let Some(message) = message {
                println!("{}", message);
            }
        }
        Ok(DeleteOutcome::Blocked {
            entry_id,
            reason,
            message,
            restored,
        }) => {
            let detail = message.map(|m| format!(" ({})", m)).unwrap_or_default();
            let note = if restored {
                format!(" Entry {} is back on the board.", entry_id)
            } else {
                " Run 'ridgeline board' to re-sync.".to_string()
            };
            user_error(&format!("Delete blocked: {}{}.{}", reason, detail, note));
        }
        Ok(DeleteOutcome::Failed {
            entry_id,
            error,
            restored,
        }) => {
            use crate::cli::error::internal_error;
            let note = if restored {
                format!(" Entry {} is back on the board.", entry_id)
            } else {
                " Run 'ridgeline board' to re-sync.".to_string()
            };
            internal_error(&format!("delete request failed: {}.{}", error, note));
        }
    }
    Ok(())
}

async fn handle_stages(json: bool) -> Result<()> {
    let (controller, _ctx) = load_board().await?;
    let snapshot = controller.snapshot();
    let stages: Vec<_> = snapshot.columns.iter().map(|c| c.stage.clone()).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&stages)?);
    } else {
        println!(
            "{}",
            render_stage_table(&stages, controller.used_fallback(), output::is_tty())
        );
    }
    Ok(())
}

async fn handle_status(json: bool) -> Result<()> {
    let (controller, _ctx) = load_board().await?;
    let snapshot = controller.snapshot();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&compute_status_report(&snapshot))?
        );
    } else {
        println!("{}", compute_pipeline_status(&snapshot));
    }
    Ok(())
}
