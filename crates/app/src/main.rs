use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use services::{
    Clock, CourseCatalog, QuizLoopService, QuizState, SilentPlayer, SubmitOutcome,
    TimeoutScheduler,
};
use solfa_core::model::{CourseId, Pitch, QuizResult};
use storage::repository::Storage;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourse { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourse { raw } => write!(f, "invalid --course value: {raw}"),
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
    eprintln!("  cargo run -p app -- play    [--db <sqlite_url>] [--course <id>]");
    eprintln!("  cargo run -p app -- results [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- export  [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- delete  [--db <sqlite_url>] (--course <id> | --all)");
    eprintln!();
    eprintln!("Courses: pre-test, basic, single, multiple, final, post-test");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:solfa.sqlite3  --course basic");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SOLFA_DB_URL, SOLFA_COURSE");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Results,
    Export,
    Delete,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "results" => Some(Self::Results),
            "export" => Some(Self::Export),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    course: CourseId,
    delete_all: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("SOLFA_DB_URL").unwrap_or_else(|_| "sqlite:solfa.sqlite3".into()),
        );
        let mut course = std::env::var("SOLFA_COURSE")
            .ok()
            .and_then(|value| CourseId::from_str(&value).ok())
            .unwrap_or(CourseId::Basic);
        let mut delete_all = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--course" => {
                    let value = require_value(args, "--course")?;
                    course = CourseId::from_str(&value)
                        .map_err(|_| ArgsError::InvalidCourse { raw: value.clone() })?;
                }
                "--all" => delete_all = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            course,
            delete_all,
        })
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

fn ensure_sqlite_file_exists(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

/// Lines typed by the user, delivered without blocking the async loop.
fn spawn_stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

fn print_question(session: &services::QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    println!();
    println!(
        "Question {}/{} [{}]",
        session.current_index() + 1,
        session.total_questions(),
        question.image_path()
    );
    if let Some(description) = question.description() {
        println!("  {description}");
    }
    if let Some(limit) = session.course().time_limit_for(question) {
        println!("  time limit: {}s", limit / 1000);
    }
    println!(
        "  expected pitches: {}  (type pitch names, `reset`, or `quit`)",
        question.required_len()
    );
}

fn print_verdict(session: &services::QuizSession) {
    match session.state() {
        QuizState::Correct => println!("  correct!"),
        QuizState::Incorrect => {
            let expected: Vec<String> = session
                .current_question()
                .map(|q| q.expected().iter().map(ToString::to_string).collect())
                .unwrap_or_default();
            println!("  incorrect. answer: {}", expected.join(" "));
        }
        QuizState::Answering | QuizState::Completed => {}
    }
}

fn print_summary(result: &QuizResult) {
    println!();
    println!("── {} ──", result.course_name());
    println!(
        "  {}/{} correct ({}%)",
        result.correct_count(),
        result.total_questions(),
        result.accuracy_percent()
    );
    println!(
        "  average first response: {} ms",
        result.average_response_time_ms()
    );
    println!("  total time: {} ms", result.total_time_ms());
}

async fn run_play(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    ensure_sqlite_file_exists(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    let catalog = CourseCatalog::new();
    let course = catalog.course(args.course)?;
    println!("{} — {} questions", course.name(), course.question_count());

    let quiz = QuizLoopService::new(
        Clock::default_clock(),
        Arc::clone(&storage.results),
        Arc::new(SilentPlayer),
    );

    let (mut session, first_timer) = quiz.start(course);
    let (mut scheduler, mut timeouts) = TimeoutScheduler::new();
    if let Some(timer) = first_timer {
        scheduler.arm(timer);
    }

    let mut lines = spawn_stdin_lines();
    print_question(&session);

    while !session.is_complete() {
        tokio::select! {
            Some(generation) = timeouts.recv() => {
                if quiz.timeout(&mut session, generation) {
                    println!("  time is up.");
                    print_verdict(&session);
                    println!("  press enter to continue");
                }
            }
            line = lines.recv() => {
                let Some(line) = line else { break };
                if line == "quit" {
                    scheduler.disarm();
                    println!("aborted; nothing saved.");
                    return Ok(());
                }
                handle_line(&quiz, &mut session, &mut scheduler, &line);
            }
        }
    }

    scheduler.disarm();
    let result = quiz.complete(&session).await?;
    print_summary(&result);
    Ok(())
}

fn handle_line(
    quiz: &QuizLoopService,
    session: &mut services::QuizSession,
    scheduler: &mut TimeoutScheduler,
    line: &str,
) {
    match session.state() {
        QuizState::Answering => {
            if line == "reset" {
                quiz.reset(session);
                println!("  answer cleared.");
                return;
            }
            for token in line.split_whitespace() {
                let Ok(pitch) = token.parse::<Pitch>() else {
                    println!("  unknown pitch: {token}");
                    continue;
                };
                match quiz.submit(session, pitch) {
                    SubmitOutcome::Accepted => {}
                    SubmitOutcome::Graded { .. } => {
                        scheduler.disarm();
                        print_verdict(session);
                        println!("  press enter to continue");
                        break;
                    }
                    SubmitOutcome::Ignored => break,
                }
            }
        }
        QuizState::Correct | QuizState::Incorrect => {
            if quiz.is_playback_in_progress() {
                println!("  (answer still playing)");
                return;
            }
            // Any line advances past a graded question.
            match quiz.advance(session) {
                services::AdvanceOutcome::NextQuestion(timer) => {
                    if let Some(timer) = timer {
                        scheduler.arm(timer);
                    }
                    print_question(session);
                }
                services::AdvanceOutcome::Completed | services::AdvanceOutcome::Ignored => {}
            }
        }
        QuizState::Completed => {}
    }
}

async fn run_results(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    ensure_sqlite_file_exists(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let catalog = CourseCatalog::new();

    let mut results = storage.results.get_all().await?;
    results.sort_by_key(|r| catalog.display_rank(r.course_name()));

    if results.is_empty() {
        println!("no results stored yet.");
        return Ok(());
    }
    for result in &results {
        println!(
            "{:<20} {:>2}/{:<2} ({:>3}%)  avg first response {} ms, total {} ms",
            result.course_name(),
            result.correct_count(),
            result.total_questions(),
            result.accuracy_percent(),
            result.average_response_time_ms(),
            result.total_time_ms(),
        );
    }
    Ok(())
}

async fn run_export(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    ensure_sqlite_file_exists(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let catalog = CourseCatalog::new();

    let mut results = storage.results.get_all().await?;
    results.sort_by_key(|r| catalog.display_rank(r.course_name()));

    let csv = services::render_csv(&services::result_rows(&results));
    println!("{csv}");
    Ok(())
}

async fn run_delete(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    ensure_sqlite_file_exists(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    if args.delete_all {
        storage.results.delete_all().await?;
        println!("all results deleted.");
    } else {
        let catalog = CourseCatalog::new();
        let entry = catalog
            .entries()
            .into_iter()
            .find(|e| e.id == args.course)
            .ok_or("course is not in the catalog")?;
        storage.results.delete(entry.name).await?;
        println!("result for {} deleted.", entry.name);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() {
        print_usage();
        return Ok(());
    }

    let Some(command) = Command::from_arg(&argv.remove(0)) else {
        print_usage();
        return Err("unknown command".into());
    };
    let args = Args::parse(&mut argv.into_iter())?;

    match command {
        Command::Play => run_play(&args).await,
        Command::Results => run_results(&args).await,
        Command::Export => run_export(&args).await,
        Command::Delete => run_delete(&args).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_memory_and_full_urls() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".to_string()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/solfa.sqlite3".to_string()),
            "sqlite:///tmp/solfa.sqlite3"
        );
    }

    #[test]
    fn normalize_makes_relative_paths_absolute() {
        let url = normalize_sqlite_url("sqlite:solfa.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"), "got {url}");
        assert!(url.ends_with("/solfa.sqlite3"));

        let bare = normalize_sqlite_url("solfa.sqlite3".to_string());
        assert_eq!(bare, url);
    }

    #[test]
    fn default_db_url_is_normalized() {
        // The default and an explicit `--db sqlite:solfa.sqlite3` must agree.
        let default = normalize_sqlite_url("sqlite:solfa.sqlite3".to_string());
        assert!(default.starts_with("sqlite://"));
        assert!(ensure_sqlite_file_exists(&default).is_ok());

        let path = default.strip_prefix("sqlite://").unwrap();
        assert!(std::path::Path::new(path).exists());
        let _ = std::fs::remove_file(path);
    }
}
