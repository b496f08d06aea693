//! Command-line interface for voxcal.
//!
//! Running `voxcal` with no subcommand opens the interactive menu;
//! `record` processes a single voice note and exits; `config` prints the
//! resolved configuration.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::audio::CaptureMode;
use crate::config::Settings;
use crate::core::{Orchestrator, PipelineOutcome};

/// voxcal - voice note to calendar pipeline
#[derive(Parser, Debug)]
#[command(name = "voxcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (the default when no subcommand is given)
    Menu,

    /// Record one voice note, process it, and exit
    Record {
        /// Recording duration in seconds (Ctrl+C stops when omitted)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the parsed command
    pub async fn execute(self) -> Result<()> {
        match self.command.unwrap_or(Commands::Menu) {
            Commands::Menu => execute_menu().await,
            Commands::Record { duration } => execute_record(duration).await,
            Commands::Config => execute_config(),
        }
    }
}

/// Forward stdin lines over a channel so the menu loop and the
/// manual-stop listener share one reader.
fn spawn_stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}

/// The interactive loop: record, process, report, repeat.
async fn execute_menu() -> Result<()> {
    let settings = Settings::load()?;
    let orchestrator = Orchestrator::from_settings(&settings);

    println!("voxcal - voice note recorder");
    println!("{}", "=".repeat(50));

    let mut input = spawn_stdin_lines();

    loop {
        println!();
        println!("Options:");
        println!("1. Record voice note (press Enter to stop)");
        println!("2. Record voice note (10 seconds)");
        println!("3. Record voice note (30 seconds)");
        println!("4. Quit");
        println!();
        print!("Enter your choice (1-4): ");
        std::io::stdout().flush()?;

        let Some(choice) = input.recv().await else {
            break;
        };

        let outcome = match choice.trim() {
            "1" => record_until_enter(&orchestrator, &mut input).await,
            "2" => {
                orchestrator
                    .process_voice_note(CaptureMode::Fixed(Duration::from_secs(10)))
                    .await
            }
            "3" => {
                orchestrator
                    .process_voice_note(CaptureMode::Fixed(Duration::from_secs(30)))
                    .await
            }
            "4" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Invalid choice. Please try again.");
                continue;
            }
        };

        print_outcome(&outcome);
    }

    Ok(())
}

/// Manual-stop recording: the pipeline runs while this function waits for
/// the next Enter press, then fires the single-slot stop signal and
/// awaits the remaining stages.
async fn record_until_enter(
    orchestrator: &Orchestrator,
    input: &mut mpsc::Receiver<String>,
) -> PipelineOutcome {
    let (stop_tx, stop_rx) = oneshot::channel();

    println!("Recording... press Enter to stop");

    let run = orchestrator.process_voice_note(CaptureMode::UntilStopped(stop_rx));
    tokio::pin!(run);

    tokio::select! {
        outcome = &mut run => return outcome,
        line = input.recv() => {
            // Enter pressed (or stdin closed): request the stop once
            let _ = line;
            let _ = stop_tx.send(());
        }
    }

    (&mut run).await
}

/// One-shot recording for scripted use.
async fn execute_record(duration: Option<u64>) -> Result<()> {
    let settings = Settings::load()?;
    let orchestrator = Orchestrator::from_settings(&settings);

    let mode = match duration {
        Some(secs) => CaptureMode::Fixed(Duration::from_secs(secs)),
        None => {
            let (stop_tx, stop_rx) = oneshot::channel();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                let _ = stop_tx.send(());
            });
            println!("Recording... press Ctrl+C to stop");
            CaptureMode::UntilStopped(stop_rx)
        }
    };

    let outcome = orchestrator.process_voice_note(mode).await;
    print_outcome(&outcome);

    Ok(())
}

/// Show resolved configuration
fn execute_config() -> Result<()> {
    let settings = Settings::load()?;

    println!();
    println!("voxcal configuration");
    println!("{}", "=".repeat(50));
    println!();
    match &settings.config_file {
        Some(path) => println!("Config file:   {}", path.display()),
        None => println!("Config file:   (none found)"),
    }
    println!();

    match &settings.whisper {
        Some(w) => println!("Transcription: configured (model {}, {})", w.model, w.base_url),
        None => println!("Transcription: not configured (set WHISPER_API_KEY)"),
    }
    match &settings.llm {
        Some(l) => println!("Model:         configured (model {}, {})", l.model, l.base_url),
        None => println!("Model:         not configured (set LLM_API_KEY)"),
    }
    match &settings.notion {
        Some(_) => println!("Notes:         configured"),
        None => println!("Notes:         not configured (set NOTION_API_KEY and NOTION_PARENT_PAGE_ID)"),
    }

    println!();
    let credentials = &settings.calendar.credentials_path;
    let token = &settings.calendar.token_path;
    println!(
        "Calendar client secret: {} ({})",
        credentials.display(),
        if credentials.exists() { "present" } else { "missing" }
    );
    println!(
        "Calendar token cache:   {} ({})",
        token.display(),
        if token.exists() { "present" } else { "missing" }
    );

    Ok(())
}

/// Print a per-run summary, mirroring the log outcome for the terminal.
fn print_outcome(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::Success {
            transcript,
            event,
            note_url,
            event_link,
            ..
        } => {
            println!();
            println!("Processing Summary:");
            println!("  Transcription: {}", transcript_preview(transcript));
            println!("  Event Title:   {}", event.title);
            if !note_url.is_empty() {
                println!("  Note:          {note_url}");
            }
            if !event_link.is_empty() {
                println!("  Calendar:      {event_link}");
            }
        }
        PipelineOutcome::Error { stage, message, .. } => {
            println!();
            println!("Error while {stage}: {message}");
        }
    }
}

/// First 100 characters of the transcript, on a char boundary.
fn transcript_preview(transcript: &str) -> String {
    let preview: String = transcript.chars().take(100).collect();
    if preview.len() < transcript.len() {
        format!("{preview}...")
    } else {
        preview
    }
}
