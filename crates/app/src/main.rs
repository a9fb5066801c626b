mod terminal;
mod voice;

use std::fmt;
use std::sync::Arc;

use academy_core::model::UserId;
use academy_core::report::ProgressReport;
use services::speech::{AudioOutput, LocalVoice};
use services::{AppServices, Clock, SpeechPlayer};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

use crate::terminal::{Terminal, print_report};
use crate::voice::{CommandAudioOutput, CommandLocalVoice};

const DEFAULT_DB_URL: &str = "sqlite://academy.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
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
    eprintln!("  academy quiz     [--db <sqlite_url> | --memory] [--user <uuid>] [-v]");
    eprintln!("  academy progress [--db <sqlite_url> | --memory] [--user <uuid>] [-v]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  command quiz, --db {DEFAULT_DB_URL}, the local learner profile");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ACADEMY_DB_URL, ACADEMY_USER_ID, RUST_LOG");
    eprintln!("  ACADEMY_OPENAI_API_KEY, ACADEMY_OPENAI_BASE_URL, ACADEMY_OPENAI_MODEL,");
    eprintln!("  ACADEMY_OPENAI_TIMEOUT_SECS");
    eprintln!("  ACADEMY_ELEVENLABS_API_KEY, ACADEMY_ELEVENLABS_VOICE_ID,");
    eprintln!("  ACADEMY_ELEVENLABS_TIMEOUT_SECS");
    eprintln!("  ACADEMY_AUDIO_PLAYER, ACADEMY_LOCAL_VOICE");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    Sqlite(String),
    Memory,
}

#[derive(Debug)]
struct Args {
    backend: Backend,
    user: UserId,
    verbosity: u8,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut backend = env("ACADEMY_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(
                || Backend::Sqlite(DEFAULT_DB_URL.into()),
                |value| Backend::Sqlite(normalize_sqlite_url(value)),
            );
        let mut user = match env("ACADEMY_USER_ID") {
            Some(raw) => parse_user(raw)?,
            None => local_learner(),
        };
        let mut verbosity = 0_u8;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    backend = Backend::Sqlite(normalize_sqlite_url(value));
                }
                "--memory" => backend = Backend::Memory,
                "--user" => user = parse_user(require_value(args, "--user")?)?,
                "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
                "-vv" => verbosity = verbosity.saturating_add(2),
                "-vvv" => verbosity = verbosity.saturating_add(3),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            backend,
            user,
            verbosity,
        })
    }
}

fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidUserId { raw })
}

/// The default profile when no learner id is given, so progress carries across runs.
fn local_learner() -> UserId {
    UserId::new(uuid::Uuid::nil())
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
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
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
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

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_services(args: &Args, clock: Clock) -> Result<AppServices, Box<dyn std::error::Error>> {
    match &args.backend {
        Backend::Memory => Ok(AppServices::new(Some(Storage::in_memory()), clock, args.user)?),
        Backend::Sqlite(url) => {
            // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
            prepare_sqlite_file(url)?;
            Ok(AppServices::new_sqlite(url, clock, args.user).await?)
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter(), |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing(parsed.verbosity);
    tracing::debug!(?parsed, ?cmd, "starting");

    let services = build_services(&parsed, Clock::system()).await?;

    match cmd {
        Command::Quiz => {
            let output: Arc<dyn AudioOutput> = Arc::new(CommandAudioOutput::from_env());
            let local: Arc<dyn LocalVoice> = Arc::new(CommandLocalVoice::from_env());
            let speech = Arc::new(SpeechPlayer::new(services.remote_voice(), output, Some(local)));
            Terminal::new(services, speech).run().await
        }
        Command::Progress => {
            let study = services.study();
            if !study.has_storage() {
                eprintln!("progress: no storage configured");
            }
            let book = study.progress().await?;
            print_report(&ProgressReport::from_book(&book));

            let history = study.history(None, 10).await?;
            if !history.is_empty() {
                println!("\nRecent attempts:");
                for record in history {
                    println!(
                        "  {}  {:<28} {:>3}%",
                        record.completed_at.format("%Y-%m-%d %H:%M"),
                        record.topic.title(),
                        record.score
                    );
                }
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut iter = args.iter().map(|a| (*a).to_owned());
        Args::parse(&mut iter, |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn defaults_use_local_learner_and_sqlite_file() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.backend, Backend::Sqlite(DEFAULT_DB_URL.into()));
        assert_eq!(args.user, local_learner());
        assert_eq!(args.verbosity, 0);
    }

    #[test]
    fn flags_override_environment() {
        let user = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let args = parse(
            &["--memory", "--user", user, "-v", "-v"],
            &[("ACADEMY_DB_URL", "sqlite:///tmp/other.db")],
        )
        .unwrap();
        assert_eq!(args.backend, Backend::Memory);
        assert_eq!(args.user.to_string(), user);
        assert_eq!(args.verbosity, 2);
    }

    #[test]
    fn env_user_and_db_are_read() {
        let args = parse(
            &[],
            &[
                ("ACADEMY_DB_URL", "sqlite:///var/lib/academy.db"),
                ("ACADEMY_USER_ID", "67e55044-10b1-426f-9247-bb680e5fe0c8"),
            ],
        )
        .unwrap();
        assert_eq!(
            args.backend,
            Backend::Sqlite("sqlite:///var/lib/academy.db".into())
        );
        assert_ne!(args.user, local_learner());
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            parse(&["--user", "bob"], &[]),
            Err(ArgsError::InvalidUserId { .. })
        ));
        assert!(matches!(
            parse(&["--db"], &[]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse(&["--db", "  "], &[]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
        assert!(matches!(
            parse(&["--colour"], &[]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/academy.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/academy.db"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }
}
