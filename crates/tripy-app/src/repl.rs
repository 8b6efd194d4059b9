//! Interactive chat surface on stdin/stdout.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tripy_ai::prompts::GREETING;
use tripy_ai::TokenTracker;
use tripy_common::{Role, SessionId, TripyError, Turn};
use tripy_store::SessionSummary;

use crate::boot::Tripy;
use crate::commands::{self, Command, HELP};

const PROMPT: &str = ">>> : ";
const SPEAKER: &str = "Tripy: ";

enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    app: Tripy,
}

impl Repl {
    pub fn new(app: Tripy) -> Self {
        Self { app }
    }

    /// Read lines until `quit` or end of input.
    pub async fn run(&mut self) -> Result<(), TripyError> {
        print_banner(self.app.sessions.current_id());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            prompt()?;
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            match self.handle(commands::parse(&line)).await {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }

        println!("{SPEAKER}GoodBye!");
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Empty => {}
            Command::Quit => return Flow::Quit,
            Command::Message(text) => self.send(&text).await,
            Command::Help => println!("{HELP}"),
            Command::Invalid(message) => println!("{message}"),
            Command::New => {
                let id = self.app.sessions.start_new();
                println!("Started a new conversation ({}).", id.short());
            }
            Command::Sessions => match self.app.sessions.summaries() {
                Ok(summaries) => {
                    print!("{}", render_sessions(&summaries, self.app.sessions.current_id()))
                }
                Err(e) => println!("Could not list conversations: {e}"),
            },
            Command::Switch(prefix) => match self.app.sessions.resolve(&prefix) {
                Ok(Some(id)) => {
                    self.app.sessions.switch(id);
                    let turns = self.app.sessions.history().map(|h| h.len()).unwrap_or(0);
                    println!(
                        "Switched to conversation {} ({turns} messages).",
                        self.app.sessions.current_id().short()
                    );
                }
                Ok(None) => println!("No conversation matches '{prefix}'."),
                Err(e) => println!("{e}"),
            },
            Command::Delete(prefix) => self.delete(prefix.as_deref()),
            Command::History => match self.app.sessions.history() {
                Ok(turns) => print!("{}", render_history(&turns)),
                Err(e) => println!("Could not read this conversation: {e}"),
            },
            Command::Usage => print!("{}", render_usage(&self.app.sessions.current().usage())),
        }
        Flow::Continue
    }

    async fn send(&self, text: &str) {
        let ctx = self.app.sessions.current();
        print!("{SPEAKER}");
        flush();

        let reply = if self.app.stream {
            let printed = Arc::new(Mutex::new(String::new()));
            let shown = printed.clone();
            let reply = self
                .app
                .agent
                .respond_streaming(ctx, text, move |chunk| {
                    print!("{chunk}");
                    flush();
                    if let Ok(mut shown) = shown.lock() {
                        shown.push_str(&chunk);
                    }
                })
                .await;
            let printed = printed.lock().map(|p| p.clone()).unwrap_or_default();
            if !printed.is_empty() {
                println!();
                // Failures and fallbacks are not part of the stream.
                if !printed.ends_with(&reply.text) {
                    println!("{SPEAKER}{}", reply.text);
                }
                return;
            }
            reply
        } else {
            self.app.agent.respond(ctx, text).await
        };

        println!("{}", reply.text);
        if !reply.persisted && !reply.is_failed() {
            warn!(session = %ctx.id().short(), "reply shown but not saved");
        }
        debug!(status = ?reply.status, "reply printed");
    }

    fn delete(&mut self, prefix: Option<&str>) {
        let target = match prefix {
            None => self.app.sessions.current_id().clone(),
            Some(prefix) => match self.app.sessions.resolve(prefix) {
                Ok(Some(id)) => id,
                Ok(None) => {
                    println!("No conversation matches '{prefix}'.");
                    return;
                }
                Err(e) => {
                    println!("{e}");
                    return;
                }
            },
        };
        match self.app.sessions.delete(&target) {
            Ok(current) => println!(
                "Deleted conversation {}. Current conversation: {}.",
                target.short(),
                current.short()
            ),
            Err(e) => println!("Could not delete conversation: {e}"),
        }
    }
}

fn print_banner(session: &SessionId) {
    println!("Welcome to the Smart Trip Planner!");
    println!("{}", "=".repeat(40));
    println!("{SPEAKER}{GREETING}");
    println!("Type 'quit' to exit at any time. Type /help for commands.");
    debug!(session = %session.short(), "chat started");
}

fn prompt() -> Result<(), TripyError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\n{PROMPT}")?;
    stdout.flush()?;
    Ok(())
}

fn flush() {
    if let Err(e) = std::io::stdout().flush() {
        debug!("stdout flush failed: {e}");
    }
}

pub fn render_sessions(summaries: &[SessionSummary], current: &SessionId) -> String {
    if summaries.is_empty() {
        return "No saved conversations yet.\n".to_string();
    }
    let mut out = String::new();
    for summary in summaries {
        let marker = if &summary.id == current { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {}  {}  {:>3} msgs  {}\n",
            summary.id.short(),
            summary.last_active.format("%Y-%m-%d %H:%M"),
            summary.turn_count,
            summary.title.as_deref().unwrap_or("(untitled)")
        ));
    }
    out
}

pub fn render_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "This conversation is empty.\n".to_string();
    }
    turns
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::Human => "You",
                _ => "Tripy",
            };
            format!("{speaker}: {}\n", turn.content)
        })
        .collect()
}

pub fn render_usage(usage: &TokenTracker) -> String {
    let total = usage.total();
    format!(
        "Turns: {}  Model calls: {}  Tool calls: {}\nTokens: {} in, {} out, {} total\n",
        usage.turns(),
        usage.model_calls(),
        usage.tool_calls(),
        total.input_tokens,
        total.output_tokens,
        usage.total_tokens()
    )
}
