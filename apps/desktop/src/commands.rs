//! Parsing of terminal input lines into REPL commands.

use std::path::PathBuf;

use shared::domain::{Message, Role};

pub const HELP_TEXT: &str = "\
Commands:
  /upload <path>...   upload one or more files (non-PDF files are skipped)
  /upload1 <path>     upload a single file (non-PDF files are rejected)
  /remove <n>         remove document number n from the context
  /docs               list loaded documents
  /status             probe the analysis service
  /help               show this help
  /quit               exit
Any other line is sent to the assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Chat(String),
    Upload(Vec<PathBuf>),
    UploadSingle(PathBuf),
    /// 1-based position as shown by `/docs`.
    Remove(usize),
    Docs,
    Status,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    if !trimmed.starts_with('/') {
        return ReplCommand::Chat(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    match command {
        "/upload" => {
            let paths = split_paths(rest);
            if paths.is_empty() {
                ReplCommand::Invalid("usage: /upload <path>...".into())
            } else {
                ReplCommand::Upload(paths)
            }
        }
        "/upload1" => match split_paths(rest).as_slice() {
            [path] => ReplCommand::UploadSingle(path.clone()),
            _ => ReplCommand::Invalid("usage: /upload1 <path>".into()),
        },
        "/remove" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => ReplCommand::Remove(n),
            _ => ReplCommand::Invalid("usage: /remove <n> (n starts at 1)".into()),
        },
        "/docs" => ReplCommand::Docs,
        "/status" => ReplCommand::Status,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("unknown command {other}; try /help")),
    }
}

/// Splits on whitespace, keeping double-quoted segments together.
fn split_paths(raw: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in raw.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(PathBuf::from(current));
    }
    paths
}

pub fn render_message(message: &Message) -> String {
    match message.role {
        Role::Assistant => format!("AI: {}", message.content),
        Role::User => format!("You: {}", message.content),
        Role::System => message.content.clone(),
    }
}
