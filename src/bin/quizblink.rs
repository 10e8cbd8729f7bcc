// QuizBlink CLI - spells quiz answers on the Caps Lock LED
// This binary provides a terminal-based interface with argument parsing

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use quizblink::answers::{AnswerSource, AnswerSymbol, FileAnswerSource, RemoteAnswerSource};
use quizblink::constants::{BLINK_DURATION_MAX_MS, BLINK_DURATION_MIN_MS, DIRECT_BLINK_MAX};
use quizblink::error::SignalError;
use quizblink::input::hotkeys::HotkeySource;
use quizblink::input::stdin::{spawn_reader, StdinHook};
use quizblink::signal::{self, BinaryOutput, CancelToken, MemoryOutput, SignalRequest, SysfsLed};
use quizblink::text::LogTextSink;
use quizblink::{config, config_file::Config, QuizBlinkCore};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

/// Spell quiz answers as Caps Lock blinks
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Spell quiz answers as Caps Lock blinks",
    long_about = "Spell quiz answers as Caps Lock blinks.

Press the trigger key, type a question number and press Enter. The answer
letter is shown on the Caps Lock LED: A=1 blink, B=2, C=3, D=4, E=5.

SETUP:
  Write a default configuration file with:
    quizblink --setup

  Configuration is stored at:
    ~/.config/quizblink/config.toml

KEYS (defaults):
  F9             Start or stop typing a question number
  0-9            Question digits (AZERTY digit row works too)
  Backspace      Delete the last digit
  Enter          Submit
  Esc            Cancel"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Write the default configuration file
    #[arg(long)]
    setup: bool,

    /// Read key names from stdin instead of registering global hotkeys
    #[arg(long)]
    stdin: bool,

    /// Blink an in-memory LED and log the transitions instead
    #[arg(long, global = true)]
    dry_run: bool,

    /// LED class device directory (default: first */capslock under /sys/class/leds)
    #[arg(long, global = true)]
    led: Option<PathBuf>,

    /// Answers JSON file (overrides config file and QUIZBLINK_ANSWERS)
    #[arg(long, global = true)]
    answers: Option<PathBuf>,

    /// Blink half-cycle in milliseconds (50-2000, overrides config file)
    /// NOTE: Keep range values in sync with BLINK_DURATION_* constants
    #[arg(long, global = true)]
    blink_duration_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Listen for question numbers (default)
    Run,
    /// Blink a count (1-20) or an answer letter (A-E) once and exit
    Blink {
        /// Number of blinks or answer letter
        value: String,
    },
    /// List the loaded answers
    Answers,
    /// Download answers from remote_url into the local answers file
    Fetch,
}

/// Write the default config file unless one exists
fn run_setup() -> Result<()> {
    println!("QuizBlink Setup");
    println!("===============\n");

    let path = Config::config_path()?;
    if path.exists() {
        println!("Configuration already exists at: {}", path.display());
        println!("Edit it directly or delete it to start over.");
        return Ok(());
    }

    let path = Config::default()
        .save()
        .context("Failed to save configuration")?;

    println!("Configuration saved to: {}", path.display());
    println!("Setup complete!");
    println!("\nPut your answers in the file named by answers_path, then run 'quizblink'.");

    Ok(())
}

/// Resolve settings (precedence: CLI arg > env var > config file)
fn resolve_config(args: &Args) -> Result<Config> {
    let mut cfg = Config::load().context("Failed to load configuration")?;
    config::apply_env_overrides(&mut cfg);

    if let Some(path) = &args.answers {
        info!("Answers file set via --answers argument: {}", path.display());
        cfg.answers_path = path.clone();
    }

    match args.blink_duration_ms {
        Some(ms) if (BLINK_DURATION_MIN_MS..=BLINK_DURATION_MAX_MS).contains(&ms) => {
            info!("Blink duration set via --blink-duration-ms argument: {} ms", ms);
            cfg.blink_duration_ms = ms;
        }
        Some(ms) => {
            warn!(
                "Invalid --blink-duration-ms value: {} (must be {}-{}). Using config file or environment variable.",
                ms, BLINK_DURATION_MIN_MS, BLINK_DURATION_MAX_MS
            );
        }
        None => {}
    }

    if let Some(led) = &args.led {
        cfg.led_path = Some(led.clone());
    }

    Ok(cfg)
}

/// Pick the indicator to blink
fn open_output(cfg: &Config, dry_run: bool) -> Result<Box<dyn BinaryOutput>> {
    if dry_run {
        info!("Dry run - blinking an in-memory LED");
        return Ok(Box::new(LoggingOutput(MemoryOutput::new(false))));
    }

    let led = match &cfg.led_path {
        Some(path) => SysfsLed::open(path),
        None => SysfsLed::discover(),
    }
    .context("Caps Lock LED is not available (try --led <dir> or --dry-run)")?;

    info!("Using LED at {}", led.path().display());
    Ok(Box::new(led))
}

/// In-memory output that also logs each change, for --dry-run
struct LoggingOutput(MemoryOutput);

impl BinaryOutput for LoggingOutput {
    fn get_state(&self) -> Result<bool, SignalError> {
        self.0.get_state()
    }

    fn set_state(&mut self, on: bool) -> Result<(), SignalError> {
        if on != self.0.state() {
            info!("LED {}", if on { "ON" } else { "OFF" });
        }
        self.0.set_state(on)
    }
}

fn parse_blink_value(value: &str) -> Result<u32> {
    if let Some(symbol) = AnswerSymbol::parse(value) {
        return Ok(symbol.blink_count());
    }
    match value.trim().parse::<u32>() {
        Ok(count) if (1..=DIRECT_BLINK_MAX).contains(&count) => Ok(count),
        Ok(count) => bail!(
            "Blink count must be 1-{} (got {})",
            DIRECT_BLINK_MAX,
            count
        ),
        Err(_) => bail!(
            "Expected a number 1-{} or a letter A-E, got '{}'",
            DIRECT_BLINK_MAX,
            value
        ),
    }
}

fn run_blink(cfg: &Config, dry_run: bool, value: &str) -> Result<()> {
    let count = parse_blink_value(value)?;
    let mut output = open_output(cfg, dry_run)?;
    let request = SignalRequest::new(count, Duration::from_millis(cfg.blink_duration_ms));

    signal::blink(output.as_mut(), request, &CancelToken::new()).context("Blink failed")?;
    Ok(())
}

fn list_answers(cfg: &Config) -> Result<()> {
    let source = FileAnswerSource::new(&cfg.answers_path);
    let map = source.load()?;

    if map.is_empty() {
        println!("No answers in {}", source.describe());
        return Ok(());
    }

    println!("Answers from {}:", source.describe());
    for (question, answer) in map.iter() {
        let is_text = cfg
            .text_questions
            .is_some_and(|[start, end]| (start..=end).contains(&question));
        match AnswerSymbol::parse(answer) {
            Some(symbol) if !is_text => {
                println!("  {:>2}: {} ({} blinks)", question, symbol, symbol.blink_count())
            }
            _ => println!("  {:>2}: {} (text)", question, answer),
        }
    }
    Ok(())
}

fn fetch_answers(cfg: &Config) -> Result<()> {
    let Some(url) = &cfg.remote_url else {
        bail!("No remote_url in the configuration file");
    };

    let remote = RemoteAnswerSource::new(url.clone())?;
    let map = remote.load()?;
    FileAnswerSource::new(&cfg.answers_path).store(&map)?;
    println!(
        "Fetched {} answers into {}",
        map.len(),
        cfg.answers_path.display()
    );
    Ok(())
}

fn run_listener(cfg: &Config, args: &Args) -> Result<()> {
    let output = open_output(cfg, args.dry_run)?;
    let controller_config = cfg.controller_config();
    let source = Box::new(FileAnswerSource::new(&cfg.answers_path));

    let mut core = QuizBlinkCore::new(
        controller_config.clone(),
        source,
        output,
        Box::new(LogTextSink),
    )
    .context("Failed to initialize QuizBlink")?;

    let (tx, rx) = mpsc::channel();

    if args.stdin {
        info!("Reading key names from stdin (e.g. 'f9 1 2 enter') - Ctrl+D to quit");
        spawn_reader(io::BufReader::new(io::stdin()), tx)?;
        core.run(rx, &mut StdinHook)?;
    } else {
        let mut hotkeys = HotkeySource::new(&controller_config, tx)
            .context("Failed to start global hotkeys (try --stdin)")?;
        info!("QuizBlink is running - press Ctrl+C to quit");
        core.run(rx, &mut hotkeys)?;
    }

    if let Some(Err(e)) = core.wait_for_signal() {
        warn!("Last blink did not finish: {}", e);
    }
    info!("CLI shutdown complete");
    Ok(())
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Handle setup command
    if args.setup {
        return run_setup();
    }

    let cfg = match resolve_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{:#}", e);
            error!("Fix the file or run 'quizblink --setup' after removing it.");
            std::process::exit(1);
        }
    };

    let result = match &args.command {
        None | Some(Command::Run) => run_listener(&cfg, &args),
        Some(Command::Blink { value }) => run_blink(&cfg, args.dry_run, value),
        Some(Command::Answers) => list_answers(&cfg),
        Some(Command::Fetch) => fetch_answers(&cfg),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
