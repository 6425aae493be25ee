use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use statelayout::{Rect, State, StateLayout, StateLayoutConfig};
use tracing_subscriber::EnvFilter;
use web_time::{Duration, Instant};

use crate::error::{DemoError, Result};
use crate::screen::{MainScreen, Outcome, Settings};

const MIN_WIDTH: u16 = 16;
const MIN_HEIGHT: u16 = 8;
const IDLE_WAIT: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(
    name = "statelayout-demo",
    about = "Drive a StateLayout through a fake request that fails, retries and succeeds",
    version
)]
pub struct Args {
    /// TOML or JSON file with overlay defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// How long the fake request takes, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    pub delay_ms: u64,

    /// Number of leading attempts that fail.
    #[arg(long, default_value_t = 1)]
    pub fail_attempts: u32,

    /// How long the error overlay stays up before the retry button is
    /// tapped, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub retry_after_ms: u64,

    /// Give up after this many attempts.
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,

    /// Frame width in cells.
    #[arg(long, default_value_t = 48)]
    pub width: u16,

    /// Frame height in cells.
    #[arg(long, default_value_t = 14)]
    pub height: u16,

    /// Log at debug level (trace when repeated). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        if self.max_attempts == 0 {
            return Err(DemoError::invalid("--max-attempts must be at least 1"));
        }
        Ok(Settings {
            delay: Duration::from_millis(self.delay_ms),
            fail_attempts: self.fail_attempts,
            retry_after: Duration::from_millis(self.retry_after_ms),
            max_attempts: self.max_attempts,
        })
    }

    fn area(&self) -> Result<Rect> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(DemoError::invalid(format!(
                "frame must be at least {MIN_WIDTH}x{MIN_HEIGHT}, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(Rect::from_size(self.width, self.height))
    }

    fn layout_config(&self) -> Result<StateLayoutConfig> {
        match &self.config {
            Some(path) if !path.exists() => Err(DemoError::MissingPath { path: path.clone() }),
            Some(path) => Ok(StateLayoutConfig::load(path)?),
            None => Ok(StateLayoutConfig::default()),
        }
    }
}

pub fn run_from_env() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(args)
}

/// Logs go to stderr so frames on stdout stay clean.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,statelayout={level},statelayout_demo={level}"
        ))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run(args: Args) -> Result<()> {
    let settings = args.settings()?;
    let area = args.area()?;
    let layout = StateLayout::new(args.layout_config()?);
    let mut screen = MainScreen::new(layout, settings, area);
    let mut out = io::stdout().lock();

    screen.submit();
    let mut shown: Option<State> = None;
    let outcome = loop {
        let now = Instant::now();
        for msg in screen.drain(now) {
            screen.update(msg, now);
            if shown != Some(screen.state()) {
                shown = Some(screen.state());
                write_frame(&mut out, &screen)?;
            }
        }
        if let Some(outcome) = screen.outcome() {
            break outcome;
        }
        screen.wait(now, IDLE_WAIT);
    };
    screen.shutdown();

    match outcome {
        Outcome::Succeeded { attempts } => {
            tracing::info!(attempts, "done");
            Ok(())
        }
        Outcome::Exhausted { attempts } => Err(DemoError::RetriesExhausted { attempts }),
    }
}

fn write_frame(out: &mut impl Write, screen: &MainScreen) -> Result<()> {
    writeln!(out, "-- {} --", screen.state())?;
    for line in screen.frame() {
        writeln!(out, "{}", line.trim_end())?;
    }
    out.flush()?;
    Ok(())
}
