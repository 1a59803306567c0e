//! Interactive REPL for both agents.
//!
//! Uses `rustyline` for readline-style editing with persistent history,
//! one history file per mode.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use toolloop_agent::{ReactAgent, SingleShotAgent};
use toolloop_core::types::Message;
use toolloop_core::utils::get_history_path;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Resets the conversation.
const CLEAR_COMMAND: &str = "/clear";

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// An agent plus the conversation it owns for the lifetime of the REPL.
pub enum Session {
    React {
        agent: ReactAgent,
        messages: Vec<Message>,
    },
    Chat {
        agent: SingleShotAgent,
        history: Vec<Message>,
    },
}

impl Session {
    pub fn react(agent: ReactAgent) -> Self {
        let messages = agent.new_conversation();
        Session::React { agent, messages }
    }

    pub fn chat(agent: SingleShotAgent) -> Self {
        Session::Chat {
            agent,
            history: Vec::new(),
        }
    }

    /// Short mode name, also used for the history file.
    fn mode(&self) -> &'static str {
        match self {
            Session::React { .. } => "react",
            Session::Chat { .. } => "chat",
        }
    }

    fn model(&self) -> &str {
        match self {
            Session::React { agent, .. } => agent.model(),
            Session::Chat { agent, .. } => agent.model(),
        }
    }

    async fn handle(&mut self, input: &str) -> String {
        match self {
            Session::React { agent, messages } => agent.respond(messages, input).await,
            Session::Chat { agent, history } => {
                let printer = helpers::StatusPrinter;
                agent.process_message(history, input, &printer).await
            }
        }
    }

    fn clear(&mut self) {
        match self {
            Session::React { agent, messages } => *messages = agent.new_conversation(),
            Session::Chat { history, .. } => history.clear(),
        }
    }
}

// ─────────────────────────────────────────────
// Loop
// ─────────────────────────────────────────────

/// Run the interactive REPL loop.
pub async fn run(mut session: Session) -> Result<()> {
    helpers::print_banner(session.mode(), session.model());

    let history_file = history_path(session.mode());
    let mut editor = create_editor(&history_file)?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C: exit cleanly
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D: exit cleanly
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye! 👋");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if trimmed.eq_ignore_ascii_case(CLEAR_COMMAND) {
            session.clear();
            helpers::print_notice("Conversation cleared.");
            continue;
        }

        debug!(mode = session.mode(), input = trimmed, "processing input");
        helpers::print_thinking();
        let reply = session.handle(trimmed).await;
        helpers::clear_thinking();
        helpers::print_response(&reply);
    }

    save_history(&mut editor, &history_file);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor(history_file: &std::path::Path) -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    if history_file.exists() {
        let _ = editor.load_history(history_file);
        debug!("loaded REPL history from {}", history_file.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>, path: &std::path::Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file for a mode.
fn history_path(mode: &str) -> std::path::PathBuf {
    get_history_path().join(format!("{mode}_history"))
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
