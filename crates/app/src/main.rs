use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quiz_core::model::{DiscardPolicy, SessionConfig};
use services::{Clock, QuizService};
use storage::repository::Storage;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod console;

use console::{
    ConsoleSink, main_menu, print_high_scores, print_recent_sessions, spawn_stdin_reader,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTimeLimit { raw: String },
    InvalidLimit { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTimeLimit { raw } => write!(f, "invalid --time-limit value: {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    questions_dir: PathBuf,
    time_limit: Option<u64>,
    permanent_discard: bool,
    limit: u32,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz play   [--questions <dir>] [--db <sqlite_url>] [--time-limit <secs>]");
    eprintln!("              [--permanent-discard]");
    eprintln!("  quiz scores [--db <sqlite_url>] [--limit <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --questions questions");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --time-limit 15");
    eprintln!("  --limit 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS_DIR, QUIZ_DB_URL, QUIZ_TIME_LIMIT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Scores,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "scores" => Some(Self::Scores),
            _ => None,
        }
    }
}

fn parse_time_limit(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidTimeLimit { raw })
}

impl Args {
    /// Parse flags over defaults taken from `env` (`QUIZ_*` variables).
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url =
            env("QUIZ_DB_URL").map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut questions_dir =
            env("QUIZ_QUESTIONS_DIR").map_or_else(|| PathBuf::from("questions"), PathBuf::from);
        let mut time_limit = match env("QUIZ_TIME_LIMIT") {
            Some(raw) => Some(parse_time_limit(raw)?),
            None => None,
        };
        let mut permanent_discard = false;
        let mut limit = 10;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    questions_dir = PathBuf::from(require_value(args, "--questions")?);
                }
                "--time-limit" => {
                    time_limit = Some(parse_time_limit(require_value(args, "--time-limit")?)?);
                }
                "--permanent-discard" => permanent_discard = true,
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    limit = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            questions_dir,
            time_limit,
            permanent_discard,
            limit,
        })
    }

    fn session_config(&self) -> Result<SessionConfig, Box<dyn std::error::Error>> {
        let defaults = SessionConfig::default();
        let config = match self.time_limit {
            Some(secs) => SessionConfig::new(
                defaults.quota(),
                defaults.band_size(),
                Duration::from_secs(secs),
            )?,
            None => defaults,
        };
        let policy = if self.permanent_discard {
            DiscardPolicy::Permanent
        } else {
            DiscardPolicy::Session
        };
        Ok(config.with_discard_policy(policy))
    }
}

const MEMORY_DB: &str = "sqlite::memory:";

/// Turn a bare or `sqlite:` path into an absolute `sqlite://` URL.
fn normalize_sqlite_url(raw: String) -> String {
    if raw == MEMORY_DB || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// File path behind a `sqlite://` URL, without query parameters.
fn sqlite_file(db_url: &str) -> Option<&Path> {
    let rest = db_url.strip_prefix("sqlite://")?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty()).then_some(Path::new(path))
}

fn init_tracing() {
    // stderr keeps log lines out of the quiz screen.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let config = parsed.session_config()?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url, parsed.questions_dir.clone()).await?;
    tracing::info!(
        db = %parsed.db_url,
        questions = %parsed.questions_dir.display(),
        "storage ready"
    );

    let mut service = QuizService::from_storage(Clock::system(), config, &storage);

    match cmd {
        Command::Play => {
            let mut input = spawn_stdin_reader();
            let mut sink = ConsoleSink::new();
            main_menu(&mut service, &mut input, &mut sink).await;
        }
        Command::Scores => {
            print_high_scores(&service, parsed.limit).await;
            print_recent_sessions(&service, parsed.limit).await;
        }
    }
    Ok(())
}

/// Make sure the database file and its directory exist before connecting.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == MEMORY_DB {
        return Ok(());
    }
    let path = sqlite_file(db_url).ok_or_else(|| ArgsError::InvalidDbUrl {
        raw: db_url.to_owned(),
    })?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
