//! REPL – the terminal front end for a Hearth session.
//!
//! Anything that is not a slash-command is an utterance and runs a full
//! turn. Typing `quit`, `exit`, or `stop` ends the session.
//!
//! Supported slash-commands:
//!   /help              – show this list
//!   /facts             – list remembered facts
//!   /see [a, b, …]     – set what the camera "sees" (empty clears it)
//!   /image on|off      – switch to image-form mode with/without an image
//!   /camera            – switch back to camera mode
//!   /prompt <text>     – show the prompt for <text> without remembering or sending it
//!   /status            – show provider, model, memory file and perception source
//!   /settings          – interactively edit `~/.hearth/config.toml`
//!   /models            – list / switch Ollama models
//!   /quit | /exit      – leave the session

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Runtime;
use tracing::warn;

use hearth_perception::{PerceptionSource, ScriptedDetector};
use hearth_runtime::{MemoryUpdate, Session, prompt};
use hearth_types::{HearthError, PerceptualContext, is_quit_command};

use crate::config::{self, AiProvider, Config};
use crate::ollama;

/// Parsed REPL input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Facts,
    See(String),
    Image(bool),
    Camera,
    Prompt(String),
    Status,
    Settings,
    Models,
    Quit,
    Unknown(String),
    Say(String),
}

impl Command {
    /// Classify one trimmed, non-empty input line.
    pub fn parse(line: &str) -> Self {
        if is_quit_command(line) {
            return Command::Quit;
        }
        if !line.starts_with('/') {
            return Command::Say(line.to_string());
        }

        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };
        match cmd {
            "/help" => Command::Help,
            "/facts" => Command::Facts,
            "/see" => Command::See(arg.to_string()),
            "/image" => match arg.to_lowercase().as_str() {
                "on" | "yes" | "true" => Command::Image(true),
                "off" | "no" | "false" => Command::Image(false),
                _ => Command::Unknown(line.to_string()),
            },
            "/camera" => Command::Camera,
            "/prompt" if !arg.is_empty() => Command::Prompt(arg.to_string()),
            "/status" => Command::Status,
            "/settings" => Command::Settings,
            "/models" => Command::Models,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Everything the REPL drives.
pub struct Repl {
    session: Session,
    perception: PerceptionSource,
    /// Labels reported while in camera mode; kept across `/image` toggles.
    labels: ScriptedDetector,
    runtime: Runtime,
    cfg: Config,
}

impl Repl {
    pub fn new(session: Session, runtime: Runtime, cfg: Config) -> Self {
        Self {
            session,
            perception: PerceptionSource::default(),
            labels: ScriptedDetector::default(),
            runtime,
            cfg,
        }
    }

    /// Run until EOF, a quit command, or `shutdown` is set.
    pub fn run(mut self, shutdown: Arc<AtomicBool>) {
        let mut editor = match DefaultEditor::new() {
            Ok(ed) => Some(ed),
            Err(e) => {
                warn!(error = %e, "line editor unavailable; falling back to plain stdin");
                None
            }
        };

        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            let line = match read_line(editor.as_mut()) {
                Some(line) => line,
                None => break,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(ed) = editor.as_mut() {
                let _ = ed.add_history_entry(line);
            }

            match Command::parse(line) {
                Command::Help => cmd_help(),
                Command::Facts => self.cmd_facts(),
                Command::See(labels) => self.cmd_see(&labels),
                Command::Image(provided) => self.cmd_image(provided),
                Command::Camera => self.cmd_camera(),
                Command::Prompt(text) => self.cmd_prompt(&text),
                Command::Status => self.cmd_status(),
                Command::Settings => cmd_settings(),
                Command::Models => cmd_models(),
                Command::Quit => {
                    println!("{}", "Goodbye.".green());
                    shutdown.store(true, Ordering::SeqCst);
                    break;
                }
                Command::Unknown(other) => {
                    println!(
                        "{} '{}'. Type {} for available commands.",
                        "Unknown command:".red(),
                        other.yellow(),
                        "/help".bold()
                    );
                }
                Command::Say(utterance) => self.say(&utterance),
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Turn
    // ─────────────────────────────────────────────────────────────────────────

    fn observe(&mut self) -> PerceptualContext {
        match self.perception.observe() {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "perception failed; continuing with nothing seen");
                PerceptualContext::nothing_seen()
            }
        }
    }

    fn say(&mut self, utterance: &str) {
        let context = self.observe();
        let result = self.runtime.block_on(self.session.turn(utterance, &context));

        match result {
            Ok(outcome) => {
                report_memory(&outcome.memory);
                println!("{} {}", "AI:".bold().green(), outcome.reply);
            }
            Err(HearthError::EmptyUtterance) => {}
            Err(e) => {
                println!("{}: {}", "Assistant unavailable".red(), e);
                if self.cfg.ai_provider == AiProvider::Ollama {
                    println!("  Is Ollama running?  Try: {}", "ollama serve".bold());
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn cmd_facts(&self) {
        let store = self.session.store();
        println!(
            "{} ({})",
            "Remembered facts".bold().underline(),
            store.path().display().to_string().dimmed()
        );
        if store.is_empty() {
            println!("  {}", prompt::NO_MEMORIES.dimmed());
        }
        for (i, fact) in store.facts().iter().enumerate() {
            println!("  {:>2}. {}", i + 1, fact);
        }
    }

    fn cmd_see(&mut self, csv: &str) {
        self.labels = ScriptedDetector::from_csv(csv);
        self.perception = PerceptionSource::scripted(self.labels.clone());
        let ctx = self.observe();
        println!("  {}", prompt::render_context(&ctx).cyan());
    }

    fn cmd_image(&mut self, provided: bool) {
        self.perception = PerceptionSource::ImageForm { provided };
        println!("  {}", self.perception.describe().cyan());
    }

    fn cmd_camera(&mut self) {
        self.perception = PerceptionSource::scripted(self.labels.clone());
        println!("  {}", self.perception.describe().cyan());
    }

    fn cmd_prompt(&mut self, text: &str) {
        let context = self.observe();
        let composed = prompt::compose(self.session.store().facts(), &context, text);
        println!("{}", "System".bold().underline());
        println!("  {}", self.session.system_prompt());
        println!("{}", "Prompt".bold().underline());
        println!("  {}", composed);
    }

    fn cmd_status(&self) {
        println!("{}", "Session".bold().underline());
        println!("  Id          : {}", self.session.id().to_string().dimmed());
        println!("  Provider    : {}", self.cfg.ai_provider.to_string().yellow());
        println!("  Model       : {}", self.cfg.active_model.yellow());
        println!("  Endpoint    : {}", self.cfg.llm_base_url().dimmed());
        println!(
            "  Memory      : {} ({} fact(s))",
            self.session.store().path().display().to_string().bold(),
            self.session.store().len()
        );
        println!("  Perception  : {}", self.perception.describe());
        if !self.labels.labels().is_empty() {
            println!("  Labels      : {}", self.labels.labels().join(", "));
        }
    }
}

fn report_memory(update: &MemoryUpdate) {
    if !update.is_new() {
        return;
    }
    match update {
        MemoryUpdate::PersistFailed { reason, .. } => println!(
            "{} {}",
            "⚠  Remembered for now, but could not save:".yellow().bold(),
            reason
        ),
        _ => println!("{}", "💾 Remembered that!".green()),
    }
}

fn cmd_help() {
    println!();
    println!("{}", "Hearth Commands".bold().underline());
    println!("  {}             – list remembered facts", "/facts".bold().cyan());
    println!("  {}    – set what the camera sees", "/see a, b, …".bold().cyan());
    println!("  {}     – image-form mode", "/image on|off".bold().cyan());
    println!("  {}            – back to camera mode", "/camera".bold().cyan());
    println!("  {}     – preview a prompt", "/prompt <text>".bold().cyan());
    println!("  {}            – session details", "/status".bold().cyan());
    println!("  {}          – edit ~/.hearth/config.toml", "/settings".bold().cyan());
    println!("  {}            – list and switch Ollama models", "/models".bold().cyan());
    println!("  {}  – leave (also: quit, exit, stop)", "/quit  /exit".bold().cyan());
    println!("  Anything else is said to the assistant.");
    println!();
}

fn cmd_settings() {
    let mut cfg = match config::load() {
        Ok(Some(c)) => c,
        Ok(None) => Config::default(),
        Err(e) => {
            println!("{}: {}", "Error loading config".red(), e);
            return;
        }
    };

    println!("{}", "Settings Editor".bold().underline());
    println!("  (press Enter to keep the current value; changes apply next session)");

    let provider = prompt_str(
        &format!("  AI provider (ollama / openai) [{}]: ", cfg.ai_provider),
        &cfg.ai_provider.to_string(),
    );
    cfg.ai_provider = AiProvider::parse_or_default(&provider);

    cfg.active_model = prompt_str(
        &format!("  Active model   [{}]: ", cfg.active_model),
        &cfg.active_model,
    );

    let memory = prompt_str(
        &format!("  Memory file    [{}]: ", cfg.memory_path.display()),
        &cfg.memory_path.display().to_string(),
    );
    cfg.memory_path = memory.into();

    let temp = prompt_str(
        &format!("  Temperature    [{}]: ", cfg.temperature),
        &cfg.temperature.to_string(),
    );
    match temp.parse::<f32>() {
        Ok(t) if (0.0..=2.0).contains(&t) => cfg.temperature = t,
        _ => println!(
            "  {} '{}' is not a temperature in 0.0–2.0, keeping {}",
            "Warning:".yellow(),
            temp,
            cfg.temperature
        ),
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "{} {}",
            "✓ Settings saved to".green(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

fn cmd_models() {
    let cfg = load_config_or_default();

    println!("{}", "AI Models".bold().underline());
    println!("  Active model : {}", cfg.active_model.yellow());

    if cfg.ai_provider != AiProvider::Ollama {
        println!("  Provider: {}", cfg.ai_provider.to_string().yellow());
        println!("  (Cloud model names are set via /settings.)");
        return;
    }

    print!("  Probing Ollama at {} … ", cfg.ollama_url.dimmed());
    io::stdout().flush().ok();

    match ollama::fetch_models(&cfg.ollama_url) {
        Ok(models) if models.is_empty() => {
            println!("{}", "no models found".yellow());
            println!("  Run `ollama pull llama3` to download a model.");
        }
        Ok(models) => {
            println!("{}", "online".green());
            println!("  Available local models:");
            for m in &models {
                let active = ollama::has_model(std::slice::from_ref(m), &cfg.active_model);
                let marker = if active { "▶" } else { " " };
                println!("    {} {}", marker.green(), m.name.bold());
            }

            let new_model = prompt_str(
                &format!("  Switch to model [{}]: ", cfg.active_model),
                &cfg.active_model,
            );
            if new_model == cfg.active_model {
                return;
            }
            if !ollama::has_model(&models, &new_model) {
                println!("{} '{}'", "Unknown model:".red(), new_model.yellow());
                return;
            }
            let new_cfg = Config {
                active_model: new_model.clone(),
                ..cfg
            };
            match config::save(&new_cfg) {
                Ok(()) => println!(
                    "{} {} (next session)",
                    "✓ Active model set to".green(),
                    new_model.bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
        }
        Err(e) => {
            println!("{}", "offline".red());
            println!("  {}", e.dimmed());
            println!("  Is Ollama running?  Try: ollama serve");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// `None` on EOF, Ctrl-C, Ctrl-D, or an unrecoverable read error.
fn read_line(editor: Option<&mut DefaultEditor>) -> Option<String> {
    let prompt_text = format!("{} ", "you>".bold().cyan());
    match editor {
        Some(ed) => match ed.readline(&prompt_text) {
            Ok(line) => Some(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                None
            }
        },
        None => {
            print!("{}", prompt_text);
            io::stdout().flush().ok();
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) => None,
                Ok(_) => Some(line),
                Err(e) => {
                    eprintln!("{}: {}", "Read error".red(), e);
                    None
                }
            }
        }
    }
}

fn load_config_or_default() -> Config {
    match config::load() {
        Ok(Some(c)) => c,
        Ok(None) => Config::default(),
        Err(e) => {
            println!("{}: {} – using defaults", "Config error".red(), e);
            Config::default()
        }
    }
}

/// Prompt for a string value.  Returns `default` when the user presses Enter.
pub(crate) fn prompt_str(msg: &str, default: &str) -> String {
    print!("{}", msg);
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed
            }
        }
        Err(_) => default.to_string(),
    }
}
