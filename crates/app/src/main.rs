use std::fmt;
use std::sync::Arc;

use quizya_core::model::{ExamId, SessionId, SessionKind};
use quizya_core::timing::format_remaining;
use services::{AppServices, Clock};
use storage::kv::UnavailableStore;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidExamId { raw: String },
    InvalidSessionId { raw: String },
    InvalidKind { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidExamId { raw } => write!(f, "invalid --exam-id value: {raw}"),
            ArgsError::InvalidSessionId { raw } => write!(f, "invalid --session-id value: {raw}"),
            ArgsError::InvalidKind { raw } => write!(f, "invalid --kind value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quizya stats  --exam-id <uuid>              [--db <sqlite_url>]");
    eprintln!("  quizya timing --session-id <uuid>           [--db <sqlite_url>]");
    eprintln!("  quizya sweep  [--kind attendance|exam]      [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quizya.sqlite3");
    eprintln!("  --kind attendance");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZYA_DB_URL, RUST_LOG");
}

#[derive(Debug)]
enum Command {
    Stats { exam_id: ExamId },
    Timing { session_id: SessionId },
    Sweep { kind: SessionKind },
}

struct Args {
    db_url: String,
    command: Command,
}

impl Args {
    fn parse(name: &str, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZYA_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("quizya.sqlite3".into()), normalize_sqlite_url);
        let mut exam_id = None;
        let mut session_id = None;
        let mut kind = SessionKind::Attendance;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--exam-id" => {
                    let value = require_value(args, "--exam-id")?;
                    let parsed = value
                        .parse::<ExamId>()
                        .map_err(|_| ArgsError::InvalidExamId { raw: value.clone() })?;
                    exam_id = Some(parsed);
                }
                "--session-id" => {
                    let value = require_value(args, "--session-id")?;
                    let parsed = value
                        .parse::<SessionId>()
                        .map_err(|_| ArgsError::InvalidSessionId { raw: value.clone() })?;
                    session_id = Some(parsed);
                }
                "--kind" => {
                    let value = require_value(args, "--kind")?;
                    kind = value
                        .parse::<SessionKind>()
                        .map_err(|_| ArgsError::InvalidKind { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match name {
            "stats" => Command::Stats {
                exam_id: exam_id.ok_or(ArgsError::MissingFlag { flag: "--exam-id" })?,
            },
            "timing" => Command::Timing {
                session_id: session_id.ok_or(ArgsError::MissingFlag {
                    flag: "--session-id",
                })?,
            },
            "sweep" => Command::Sweep { kind },
            other => return Err(ArgsError::UnknownArg(other.to_string())),
        };

        Ok(Self { db_url, command })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let name = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(arg) if arg == "--help" || arg == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(arg) => arg,
    };

    let parsed = Args::parse(&name, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    tracing::debug!(db = %parsed.db_url, command = ?parsed.command, "starting");

    // The CLI runs outside any client context, so there is no guest storage.
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::system(), Arc::new(UnavailableStore))
            .await?;

    match parsed.command {
        Command::Stats { exam_id } => {
            let stats = services.dashboard().exam_stats(exam_id).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Timing { session_id } => {
            let timing = services.timing().timing(session_id).await?;
            let out = serde_json::json!({
                "sessionId": session_id,
                "status": timing.status,
                "hasAutoClosed": timing.has_auto_closed,
                "remainingMs": timing.remaining.map(|r| r.num_milliseconds()),
                "remaining": timing.remaining.map(format_remaining),
                "deadline": timing.deadline,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Sweep { kind } => {
            let closed = services.timing().close_expired(kind).await?;
            tracing::info!(kind = kind.as_str(), closed = closed.len(), "sweep finished");
            for id in closed {
                println!("{id}");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "command failed");
        std::process::exit(2);
    }
}
