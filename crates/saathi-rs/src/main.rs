//! Talk to the Saathi companion flows from the terminal.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable
//! (`flows`, `tree` and `resources` work without one).
//!
//! # Examples
//!
//! ```sh
//! # One chat turn, or an interactive session without a message
//! saathi chat "I've been feeling really stressed lately"
//! saathi chat
//!
//! # Analyze a journal entry piped from a file
//! cat entry.md | saathi mood --stdin --json
//!
//! # Save an entry through the full journal pipeline
//! saathi journal "Long day, but the walk helped." --mood calm
//!
//! # Show every flow with its output schema
//! saathi flows
//! ```

use clap::{Parser, Subcommand};
use saathi_rs::companion::crisis::alert_text;
use saathi_rs::companion::resources::SECTIONS;
use saathi_rs::companion::tree::GrowthStage;
use saathi_rs::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::io::{self, Read};
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Talk to the Saathi companion flows from the terminal.
///
/// Reads the API key from the OPENROUTER_KEY environment variable.
#[derive(Parser)]
#[command(name = "saathi", version)]
struct Cli {
    /// Model to use (overrides SAATHI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Retries for transient transport failures (overrides SAATHI_MAX_RETRIES)
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Text taken from the argument, stdin, or both.
#[derive(clap::Args)]
struct TextInput {
    /// Text to send
    text: Option<String>,

    /// Read the text from stdin
    #[arg(long)]
    stdin: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with Saathi (interactive when no message is given)
    Chat(TextInput),
    /// Check text for crisis risk
    Crisis(TextInput),
    /// Analyze the mood of a journal entry
    Mood(TextInput),
    /// Get a journaling prompt for a mood
    Prompt {
        /// Mood name, e.g. "anxious"
        mood: String,
    },
    /// Get a short mindfulness exercise or affirmation
    Mindful,
    /// Summarize a journal entry
    Summarize(TextInput),
    /// Save a journal entry (mood analysis, summary, mood record, growth point)
    Journal {
        #[command(flatten)]
        input: TextInput,
        /// Selected mood; analyzed from the text when omitted
        #[arg(long)]
        mood: Option<Mood>,
        #[arg(long)]
        title: Option<String>,
    },
    /// List the registered flows and their output schemas
    Flows,
    /// Show the resilience tree stage for a number of growth points
    Tree {
        #[arg(long, default_value_t = 0)]
        points: u32,
    },
    /// Show the self-help exercises
    Resources,
}

// ── Helpers ────────────────────────────────────────────────────────

fn read_stdin_content() -> Result<String, String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    Ok(buf)
}

fn resolve_text(input: &TextInput) -> Result<String, String> {
    let stdin_text = if input.stdin {
        Some(read_stdin_content()?)
    } else {
        None
    };

    match (&input.text, stdin_text) {
        (Some(text), Some(piped)) => Ok(format!("{text}\n\n{piped}")),
        (Some(text), None) => Ok(text.clone()),
        (None, Some(piped)) => Ok(piped),
        (None, None) => Err("provide TEXT, --stdin, or both".to_string()),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("failed to serialize output: {e}"))
}

fn build_flows(cli: &Cli) -> Result<Flows, String> {
    let mut config = SaathiConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    if let Some(retries) = cli.retries {
        config = config.with_retries(retries);
    }
    let invoker = config.build_invoker().map_err(|e| e.to_string())?;
    Flows::new(invoker).map_err(|e| format!("invalid flow definition: {e}"))
}

fn render_turn(turn: &ChatTurn) -> String {
    let mut out = format!("{}\n", turn.reply);
    if turn.crisis_alert {
        out.push('\n');
        out.push_str(&alert_text());
        out.push('\n');
    }
    out
}

async fn interactive_chat(flows: Flows, json: bool) -> Result<String, String> {
    let mut session = ChatSession::new(flows);
    if let Some(welcome) = session.transcript().first() {
        eprintln!("Saathi: {}\n", welcome.content);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("failed to read stdin: {e}"))?
    {
        let Some(turn) = session.send(&line).await else {
            continue;
        };
        if json {
            print!("{}", to_json(&turn)?);
        } else {
            println!("Saathi: {}", render_turn(&turn));
        }
    }
    Ok(String::new())
}

// ── Commands ───────────────────────────────────────────────────────

fn list_flows(json: bool) -> Result<String, String> {
    let registry =
        FlowRegistry::standard().map_err(|e| format!("invalid flow definition: {e}"))?;
    let entries: Vec<_> = registry
        .iter()
        .map(|(kind, spec)| {
            json!({
                "name": spec.name(),
                "description": kind.description(),
                "input": spec.input_schema().to_json_schema(),
                "output": spec.output_schema().to_json_schema(),
            })
        })
        .collect();
    if json {
        return to_json(&entries);
    }

    let mut out = String::new();
    for entry in &entries {
        out.push_str(&format!(
            "{} - {}\n{}\n\n",
            entry["name"].as_str().unwrap_or_default(),
            entry["description"].as_str().unwrap_or_default(),
            serde_json::to_string_pretty(&entry["output"]).unwrap_or_default()
        ));
    }
    Ok(out)
}

fn show_tree(points: u32, json: bool) -> Result<String, String> {
    let stage = GrowthStage::from_points(points);
    if json {
        return to_json(&json!({
            "growthPoints": points,
            "stage": stage.name(),
            "description": stage.description(),
        }));
    }
    Ok(format!(
        "Growth points: {points}\nStage: {}\n{}\n",
        stage.name(),
        stage.description()
    ))
}

fn show_resources(json: bool) -> Result<String, String> {
    if json {
        return to_json(&SECTIONS);
    }
    let mut out = String::new();
    for section in &SECTIONS {
        out.push_str(&format!("## {}\n\n", section.heading));
        for exercise in section.exercises {
            out.push_str(&format!("### {}\n{}\n\n", exercise.title, exercise.body));
        }
    }
    Ok(out)
}

async fn run(cli: &Cli) -> Result<String, String> {
    // Offline commands first: no API key needed.
    match &cli.command {
        Command::Flows => return list_flows(cli.json),
        Command::Tree { points } => return show_tree(*points, cli.json),
        Command::Resources => return show_resources(cli.json),
        _ => {}
    }

    let flows = build_flows(cli)?;
    let json = cli.json;

    match &cli.command {
        Command::Chat(input) if input.text.is_none() && !input.stdin => {
            interactive_chat(flows, json).await
        }
        Command::Chat(input) => {
            let text = resolve_text(input)?;
            let mut session = ChatSession::new(flows);
            let turn = session
                .send(&text)
                .await
                .ok_or_else(|| "message is blank".to_string())?;
            if json {
                to_json(&turn)
            } else {
                Ok(render_turn(&turn))
            }
        }
        Command::Crisis(input) => {
            let text = resolve_text(input)?;
            let out = flows
                .detect_crisis(&CrisisDetectionInput::new(text))
                .await
                .map_err(|e| e.to_string())?;
            if json {
                return to_json(&out);
            }
            let mut rendered = format!(
                "isCrisis: {}\nconfidence: {:.2}\n",
                out.is_crisis, out.confidence
            );
            if is_actionable(&out) {
                rendered.push('\n');
                rendered.push_str(&alert_text());
                rendered.push('\n');
            }
            Ok(rendered)
        }
        Command::Mood(input) => {
            let text = resolve_text(input)?;
            let out = flows
                .analyze_mood(&MoodAnalysisInput::new(text))
                .await
                .map_err(|e| e.to_string())?;
            if json {
                return to_json(&out);
            }
            let mood = out.mood_kind();
            Ok(format!(
                "{} {} (score {})\nvalence: {:.2}\nenergy: {:.2}\n",
                mood.emoji(),
                mood,
                mood.score(),
                out.valence,
                out.energy
            ))
        }
        Command::Prompt { mood } => {
            let out = flows
                .generate_journal_prompt(&JournalPromptInput::new(mood.clone()))
                .await
                .map_err(|e| e.to_string())?;
            if json {
                to_json(&out)
            } else {
                Ok(format!("{}\n", out.prompt))
            }
        }
        Command::Mindful => {
            let out = flows
                .generate_mindful_moment()
                .await
                .map_err(|e| e.to_string())?;
            if json {
                to_json(&out)
            } else {
                Ok(format!("{}\n", out.moment))
            }
        }
        Command::Summarize(input) => {
            let text = resolve_text(input)?;
            let out = flows
                .summarize_entry(&SummarizeEntryInput::new(text))
                .await
                .map_err(|e| e.to_string())?;
            if json {
                to_json(&out)
            } else {
                Ok(format!("{}\n", out.summary))
            }
        }
        Command::Journal { input, mood, title } => {
            let text = resolve_text(input)?;
            let mut draft = JournalDraft::new(text);
            draft.mood = *mood;
            draft.title = title.clone();

            let journal = Journal::new(flows, Arc::new(MemoryStore::new()), "local");
            let saved = journal.save(draft).await.map_err(|e| e.to_string())?;
            if json {
                return to_json(&saved);
            }
            Ok(format!(
                "{}\nmood: {} {}{}\nsummary: {}\ngrowth points: {}\n",
                saved.journal.title,
                saved.mood.mood.emoji(),
                saved.mood.mood,
                if saved.mood_detected { " (detected)" } else { "" },
                saved.journal.summary.as_deref().unwrap_or_default(),
                saved.growth_points
            ))
        }
        Command::Flows | Command::Tree { .. } | Command::Resources => Ok(String::new()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
