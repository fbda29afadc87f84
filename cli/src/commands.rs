//! Line commands for the REPL.
//!
//! Lines starting with `/` are commands; anything else is a chat message.

use ragna_engine::{Difficulty, Language, StudyWeeks, Tab, Topic, numeric_problem_id};

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub usage: &'static str,
    pub description: &'static str,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        usage: "/key <api-key>",
        description: "Validate an API key",
    },
    CommandSpec {
        usage: "/reset",
        description: "Forget the API key and cancel pending requests",
    },
    CommandSpec {
        usage: "/tab <hints|review|study|chat>",
        description: "Switch tab",
    },
    CommandSpec {
        usage: "/next, /prev",
        description: "Cycle tabs",
    },
    CommandSpec {
        usage: "/hint <problem>",
        description: "Get hints for a problem (id or name)",
    },
    CommandSpec {
        usage: "/review <language> <file> [problem-id]",
        description: "Review a solution file",
    },
    CommandSpec {
        usage: "/pattern <language> <file>",
        description: "Identify algorithmic patterns in a file",
    },
    CommandSpec {
        usage: "/plan <weeks> <topic,topic,...> [difficulty]",
        description: "Generate a study plan",
    },
    CommandSpec {
        usage: "/problems <topic> [difficulty]",
        description: "Recommend problems for a topic",
    },
    CommandSpec {
        usage: "/daily",
        description: "Fetch the daily challenge",
    },
    CommandSpec {
        usage: "/show",
        description: "Redraw the active tab",
    },
    CommandSpec {
        usage: "/help",
        description: "Show available commands",
    },
    CommandSpec {
        usage: "/quit",
        description: "Exit",
    },
];

pub fn help_text() -> String {
    let width = COMMAND_SPECS
        .iter()
        .map(|spec| spec.usage.len())
        .max()
        .unwrap_or(0);
    let mut out = String::from("Commands:\n");
    for spec in COMMAND_SPECS {
        out.push_str(&format!("  {:<width$}  {}\n", spec.usage, spec.description));
    }
    out.push_str("Any other line is sent as a chat message.");
    out
}

/// Parsed line with typed arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Key(&'a str),
    Reset,
    Tab(Tab),
    Next,
    Prev,
    Hint(&'a str),
    Review {
        language: Language,
        path: &'a str,
        problem_id: Option<i64>,
    },
    Pattern {
        language: Language,
        path: &'a str,
    },
    Plan {
        weeks: StudyWeeks,
        topics: Vec<Topic>,
        difficulty: Option<Difficulty>,
    },
    Problems {
        topic: Topic,
        difficulty: Option<Difficulty>,
    },
    Daily,
    Show,
    Help,
    Quit,
    Chat(&'a str),
    /// Recognized command with bad arguments; carries the message to show.
    Invalid(String),
    Unknown(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Chat(trimmed);
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match name {
            "key" => Command::Key(rest),
            "reset" => Command::Reset,
            "tab" => match Tab::parse(rest) {
                Some(tab) => Command::Tab(tab),
                None => usage("/tab <hints|review|study|chat>"),
            },
            "next" => Command::Next,
            "prev" => Command::Prev,
            "hint" | "hints" => Command::Hint(rest),
            "review" => parse_review(&args),
            "pattern" | "patterns" => parse_pattern(&args),
            "plan" => parse_plan(&args),
            "problems" => parse_problems(&args),
            "daily" => Command::Daily,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other),
        }
    }
}

fn usage(text: &str) -> Command<'static> {
    Command::Invalid(format!("Usage: {text}"))
}

fn language(raw: &str) -> Result<Language, Command<'static>> {
    Language::parse(raw).ok_or_else(|| {
        Command::Invalid(format!(
            "Unknown language {raw:?} (expected python, javascript, java or cpp)"
        ))
    })
}

fn difficulty(raw: Option<&&str>) -> Result<Option<Difficulty>, Command<'static>> {
    match raw {
        None => Ok(None),
        Some(raw) => Difficulty::parse(raw).map(Some).ok_or_else(|| {
            Command::Invalid(format!(
                "Unknown difficulty {raw:?} (expected easy, medium or hard)"
            ))
        }),
    }
}

fn topic(raw: &str) -> Result<Topic, Command<'static>> {
    Topic::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Topic::all().iter().map(|t| t.as_str()).collect();
        Command::Invalid(format!(
            "Unknown topic {raw:?} (expected one of {})",
            known.join(", ")
        ))
    })
}

fn parse_review<'a>(args: &[&'a str]) -> Command<'a> {
    let [lang, path, rest @ ..] = args else {
        return usage("/review <language> <file> [problem-id]");
    };
    if rest.len() > 1 {
        return usage("/review <language> <file> [problem-id]");
    }
    match language(lang) {
        Ok(language) => Command::Review {
            language,
            path: *path,
            problem_id: rest.first().and_then(|raw| numeric_problem_id(raw)),
        },
        Err(invalid) => invalid,
    }
}

fn parse_pattern<'a>(args: &[&'a str]) -> Command<'a> {
    let [lang, path] = args else {
        return usage("/pattern <language> <file>");
    };
    match language(lang) {
        Ok(language) => Command::Pattern {
            language,
            path: *path,
        },
        Err(invalid) => invalid,
    }
}

fn parse_plan<'a>(args: &[&'a str]) -> Command<'a> {
    let [weeks, topics, rest @ ..] = args else {
        return usage("/plan <weeks> <topic,topic,...> [difficulty]");
    };
    if rest.len() > 1 {
        return usage("/plan <weeks> <topic,topic,...> [difficulty]");
    }
    let weeks = match weeks.parse::<u32>().ok().and_then(|w| StudyWeeks::new(w).ok()) {
        Some(weeks) => weeks,
        None => return Command::Invalid("Weeks must be a positive number".to_string()),
    };
    let mut parsed = Vec::new();
    for raw in topics.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match topic(raw) {
            Ok(t) if !parsed.contains(&t) => parsed.push(t),
            Ok(_) => {}
            Err(invalid) => return invalid,
        }
    }
    match difficulty(rest.first()) {
        Ok(difficulty) => Command::Plan {
            weeks,
            topics: parsed,
            difficulty,
        },
        Err(invalid) => invalid,
    }
}

fn parse_problems<'a>(args: &[&'a str]) -> Command<'a> {
    let [raw_topic, rest @ ..] = args else {
        return usage("/problems <topic> [difficulty]");
    };
    if rest.len() > 1 {
        return usage("/problems <topic> [difficulty]");
    }
    let topic = match topic(raw_topic) {
        Ok(topic) => topic,
        Err(invalid) => return invalid,
    };
    match difficulty(rest.first()) {
        Ok(difficulty) => Command::Problems { topic, difficulty },
        Err(invalid) => invalid,
    }
}
