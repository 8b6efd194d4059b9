//! Chat surface command parsing.

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the assistant.
    Message(String),
    New,
    Sessions,
    Switch(String),
    /// Delete a session by prefix, or the current one.
    Delete(Option<String>),
    History,
    Usage,
    Help,
    Quit,
    Empty,
    /// A slash command that could not be understood.
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  /new               start a new conversation
  /sessions          list stored conversations
  /switch <id>       resume a conversation by id prefix
  /delete [id]       delete a conversation (default: the current one)
  /history           show the current conversation
  /usage             show token usage for this conversation
  /help              show this help
  quit | exit        leave Tripy";

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        return Command::Quit;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Message(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arg = parts.next().map(str::to_string);
    if parts.next().is_some() {
        return Command::Invalid(format!("/{name} takes at most one argument"));
    }

    match (name.as_str(), arg) {
        ("new", None) => Command::New,
        ("sessions" | "list", None) => Command::Sessions,
        ("switch", Some(id)) => Command::Switch(id),
        ("switch", None) => Command::Invalid("usage: /switch <id-prefix>".into()),
        ("delete", id) => Command::Delete(id),
        ("history", None) => Command::History,
        ("usage", None) => Command::Usage,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit", None) => Command::Quit,
        (known @ ("new" | "sessions" | "list" | "history" | "usage" | "help" | "?" | "quit" | "exit"), Some(_)) => {
            Command::Invalid(format!("/{known} takes no argument"))
        }
        (other, _) => Command::Invalid(format!("unknown command /{other}; type /help for a list")),
    }
}
