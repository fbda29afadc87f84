//! RAGna CLI - binary entry point and line-oriented session loop.
//!
//! ```text
//! main() -> load config -> App::new -> run()
//!                                       |
//!                     select! { stdin line | request completion | ctrl-c }
//! ```
//!
//! Each stdin line is parsed into a [`commands::Command`] and applied to the
//! engine. Completions are applied as they arrive and printed if they belong
//! to the active tab.

mod commands;
mod render;

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ragna_client::BackendClient;
use ragna_config::{RagnaConfig, Settings};
use ragna_engine::{App, Feature, Screen};

use commands::Command;
use render::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScreenArg {
    Search,
    Leetcode,
}

impl From<ScreenArg> for Screen {
    fn from(arg: ScreenArg) -> Self {
        match arg {
            ScreenArg::Search => Screen::Search,
            ScreenArg::Leetcode => Screen::LeetCode,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ragna", version, about = "Terminal client for the RAGnaGROQ assistant")]
struct Args {
    /// Config file to use instead of ~/.ragna/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000/api
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Which assistant to open
    #[arg(value_enum)]
    screen: Option<ScreenArg>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than interleave logs with the session.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.ragna/logs/ragna.log
    if let Some(config_path) = RagnaConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("ragna.log"));
    }

    candidates.push(PathBuf::from(".ragna").join("logs").join("ragna.log"));

    candidates
}

fn load_settings(args: &Args) -> Result<Settings> {
    let config = match &args.config {
        Some(path) => RagnaConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_context(|| format!("config file {} does not exist", path.display()))?,
        None => match RagnaConfig::load() {
            Ok(config) => config.unwrap_or_default(),
            Err(err) => {
                eprintln!("Warning: {err}; using defaults");
                RagnaConfig::default()
            }
        },
    };

    let mut settings = config.resolve();
    if let Some(url) = &args.base_url {
        settings.backend.base_url.clone_from(url);
    }
    if let Some(screen) = args.screen {
        settings.screen = screen.into();
    }
    Ok(settings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let settings = load_settings(&args)?;
    tracing::info!(?settings, "Starting");

    let client = BackendClient::new(&settings.backend).context("creating backend client")?;
    tracing::info!(
        base_url = client.base_url(),
        timeout = ?client.timeout(),
        "Backend client ready"
    );
    let mut app = App::new(client, settings.screen, settings.conversation);

    println!("{}", render::active_tab(&app));
    println!("Type /help for commands.");

    let mut transcript = Transcript::default();
    transcript.take_new(&app);

    if let Some(key) = settings.api_key() {
        println!("Validating API key from configuration...");
        report(app.submit_api_key(key), Feature::Validate);
    }

    run(&mut app, &mut transcript).await
}

async fn run(app: &mut App, transcript: &mut Transcript) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if handle_line(app, &line) == Flow::Quit {
                    break;
                }
            }
            feature = app.next_event() => on_completion(app, feature),
            _ = tokio::signal::ctrl_c() => break,
        }

        for line in transcript.take_new(app) {
            println!("{line}");
        }
        app.take_scroll_request();
    }

    tracing::info!("Session ended");
    Ok(())
}

fn handle_line(app: &mut App, line: &str) -> Flow {
    match Command::parse(line) {
        Command::Empty => {}
        Command::Quit => return Flow::Quit,
        Command::Help => println!("{}", commands::help_text()),
        Command::Show => println!("{}", render::active_tab(app)),
        Command::Unknown(name) => println!("Unknown command /{name}. Type /help."),
        Command::Invalid(message) => println!("{message}"),
        Command::Key(raw) => report(app.submit_api_key(raw), Feature::Validate),
        Command::Reset => {
            app.reset_api_key();
            println!("{}", render::session_line(app.session().state()));
        }
        Command::Tab(tab) => {
            app.select_tab(tab);
            println!("{}", render::active_tab(app));
        }
        Command::Next => {
            app.next_tab();
            println!("{}", render::active_tab(app));
        }
        Command::Prev => {
            app.prev_tab();
            println!("{}", render::active_tab(app));
        }
        Command::Chat(text) => report(app.send_chat(text), Feature::Chat),
        Command::Hint(problem) => report(app.request_hints(problem), Feature::Hints),
        Command::Review {
            language,
            path,
            problem_id,
        } => {
            if let Some(code) = read_source(path) {
                println!("Reviewing {path} as {}...", language.display_name());
                report(app.request_review(&code, language, problem_id), Feature::Review);
            }
        }
        Command::Pattern { language, path } => {
            if let Some(code) = read_source(path) {
                println!("Analyzing {path} as {}...", language.display_name());
                report(
                    app.request_pattern_analysis(&code, language),
                    Feature::Pattern,
                );
            }
        }
        Command::Plan {
            weeks,
            topics,
            difficulty,
        } => report(
            app.request_study_plan(&topics, weeks, difficulty),
            Feature::StudyPlan,
        ),
        Command::Problems { topic, difficulty } => report(
            app.request_topic_problems(topic, difficulty),
            Feature::TopicProblems,
        ),
        Command::Daily => report(app.request_daily_challenge(), Feature::DailyChallenge),
    }
    Flow::Continue
}

fn read_source(path: &str) -> Option<String> {
    match fs::read_to_string(Path::new(path)) {
        Ok(code) => Some(code),
        Err(e) => {
            println!("Could not read {path}: {e}");
            None
        }
    }
}

fn report(result: Result<(), ragna_engine::ActionError>, feature: Feature) {
    if let Err(err) = result {
        println!("! {}", err.user_message(feature));
    }
}

fn on_completion(app: &App, feature: Feature) {
    if feature == Feature::Validate {
        println!("{}", render::session_line(app.session().state()));
        if let Some(err) = app.slot(Feature::Validate).error() {
            println!("! {}", err.user_message(Feature::Validate));
        }
        return;
    }

    let active = app.view().active_tab();
    match render::tab_of(feature) {
        // Chat replies are printed through the transcript; only errors need surfacing.
        Some(_) if feature == Feature::Chat => {
            if let Some(err) = app.slot(Feature::Chat).error() {
                println!("! {}", err.user_message(Feature::Chat));
            }
        }
        Some(tab) if tab == active => println!("{}", render::slot(feature, app.slot(feature))),
        Some(tab) => println!(
            "{} updated (/tab {} to view)",
            tab.label(),
            tab.as_str()
        ),
        None => {}
    }
}
