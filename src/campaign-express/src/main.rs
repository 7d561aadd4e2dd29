//! Campaign Express — follow-up sequence tool.
//!
//! Loads a follow-up sequence from a JSON file, applies one editing
//! operation and prints the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::notifications::{noop_notifier, TracingNotifier};
use campaign_core::{FollowUpCondition, FollowUpItem, FollowUpPatch, Notifier};
use campaign_sequencing::{FollowUpSequence, SequenceEditor, SequenceReorderEngine};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-express")]
#[command(about = "Edit and review campaign follow-up sequences")]
#[command(version)]
struct Cli {
    /// JSON file holding the sequence (array of follow-ups)
    #[arg(long, short)]
    file: PathBuf,

    /// Write the resulting sequence back to the file
    #[arg(long, default_value_t = false)]
    write: bool,

    /// Days between follow-ups when delays are renumbered (overrides config)
    #[arg(long, env = "CAMPAIGN_EXPRESS__SEQUENCING__SPACING_DAYS")]
    spacing_days: Option<u32>,

    /// Keep authored delays when items move (overrides config)
    #[arg(long, default_value_t = false)]
    preserve_delays: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move the item at FROM so it ends up at TO
    Reorder {
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// Patch fields of the item at INDEX
    Update {
        #[arg(long)]
        index: usize,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        delay_days: Option<u32>,
        /// "no-response" or "all"
        #[arg(long)]
        condition: Option<String>,
    },
    /// Append a follow-up
    Add {
        #[arg(long)]
        message: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        condition: Option<String>,
    },
    /// Remove the follow-up at INDEX (the initial message stays)
    Remove {
        #[arg(long)]
        index: usize,
    },
    /// Print the display title of every item
    Titles,
    /// Print the cumulative send plan
    Schedule,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_express=info,campaign_sequencing=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(spacing) = cli.spacing_days {
        config.sequencing.spacing_days = spacing;
    }
    if cli.preserve_delays {
        config.sequencing.preserve_custom_delays = true;
    }

    info!(
        spacing_days = config.sequencing.spacing_days,
        preserve_custom_delays = config.sequencing.preserve_custom_delays,
        "Configuration loaded"
    );

    let raw = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let items: FollowUpSequence = serde_json::from_str(&raw)
        .with_context(|| format!("parsing follow-ups from {}", cli.file.display()))?;

    let notifier: Arc<dyn Notifier> = if config.notifications.enabled {
        Arc::new(TracingNotifier)
    } else {
        noop_notifier()
    };

    let mut editor = SequenceEditor::new(items, SequenceReorderEngine::from_config(&config.sequencing))
        .with_notifier(notifier);

    if cli.write {
        let path = cli.file.clone();
        editor = editor.with_persistence(Arc::new(move |items: &FollowUpSequence| {
            let written = serde_json::to_string_pretty(items)
                .map_err(anyhow::Error::from)
                .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));
            if let Err(e) = written {
                error!(error = %e, path = %path.display(), "Failed to save follow-ups");
            }
        }));
    }

    match cli.command {
        Command::Reorder { from, to } => {
            if !editor.move_item(from, to) {
                info!(from, to, "Nothing to move");
            }
            print_json(editor.items())?;
        }
        Command::Update {
            index,
            message,
            name,
            delay_days,
            condition,
        } => {
            let patch = FollowUpPatch {
                message,
                delay_days,
                name,
                condition: parse_condition(condition)?,
            };
            if !editor.update_item(index, &patch) {
                info!(index, "No follow-up at index");
            }
            print_json(editor.items())?;
        }
        Command::Add {
            message,
            name,
            id,
            condition,
        } => {
            let mut item = match id {
                Some(id) => FollowUpItem::new(id, message)?,
                None => FollowUpItem::generate(message),
            };
            if let Some(name) = name {
                item = item.with_name(name);
            }
            if let Some(condition) = parse_condition(condition)? {
                item = item.with_condition(condition);
            }
            editor.add_follow_up(item)?;
            print_json(editor.items())?;
        }
        Command::Remove { index } => {
            if !editor.remove_follow_up(index) {
                info!(index, "Nothing removed");
            }
            print_json(editor.items())?;
        }
        Command::Titles => print_json(&editor.titles())?,
        Command::Schedule => print_json(&editor.schedule())?,
    }

    Ok(())
}

fn parse_condition(raw: Option<String>) -> anyhow::Result<Option<FollowUpCondition>> {
    raw.map(|c| c.parse::<FollowUpCondition>())
        .transpose()
        .map_err(Into::into)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
