//! `hearth` – terminal front end for the household assistant.
//!
//! This binary:
//!
//! 1. Loads `.env` (for `OPENAI_API_KEY` and `HEARTH_*` overrides) and
//!    installs structured logging on stderr.
//! 2. Reads `~/.hearth/config.toml`, running a **First-Run Wizard** when the
//!    file is absent.
//! 3. Probes the local Ollama instance when it is the chosen provider.
//! 4. Opens the fact memory (`memory.json` by default) and starts a session.
//! 5. Drops the user into the **conversation REPL**; Ctrl-C ends it safely.

mod config;
mod ollama;
mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use hearth_memory::FactStore;
use hearth_runtime::{LlmDriver, Session, init_tracing};

fn main() {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    // Hold the guard until exit so pending spans are flushed.
    let _telemetry = init_tracing("hearth", "warn");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – finishing the current turn and exiting …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => run_first_run_wizard(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };
    info!(config = ?cfg, "configuration resolved");

    if cfg.ai_provider == config::AiProvider::Ollama {
        probe_ollama(&cfg);
    } else if cfg.openai_api_key.is_empty() {
        println!(
            "  {} no OpenAI API key set (config or {}).",
            "Warning:".yellow(),
            "OPENAI_API_KEY".bold()
        );
    }

    // ── Fact memory ───────────────────────────────────────────────────────
    let store = match FactStore::load(&cfg.memory_path) {
        Ok(store) => store,
        Err(e) => {
            // Refuse to start rather than silently discard stored facts.
            error!(error = %e, "fact memory unreadable");
            println!("{}: {}", "Memory error".red().bold(), e);
            println!("  Fix or move the file, then start Hearth again.");
            std::process::exit(1);
        }
    };
    println!(
        "  Memory: {} ({} fact(s))",
        cfg.memory_path.display().to_string().bold(),
        store.len()
    );

    // ── Session ───────────────────────────────────────────────────────────
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            println!("{}: {}", "Startup error".red(), e);
            std::process::exit(1);
        }
    };

    let driver = LlmDriver::new(cfg.llm_base_url(), cfg.active_model.clone())
        .with_api_key(cfg.openai_api_key.clone())
        .with_temperature(cfg.temperature);
    let session = Session::new(store, Box::new(driver)).with_system_prompt(cfg.system_prompt.clone());

    println!();
    println!(
        "  Say something, or type {} for commands. {} ends the session.\n",
        "/help".bold().cyan(),
        "quit".bold()
    );

    repl::Repl::new(session, runtime, cfg).run(shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// Start-up helpers
// ─────────────────────────────────────────────────────────────────────────────

fn probe_ollama(cfg: &config::Config) {
    print!("\n  Probing Ollama at {} … ", cfg.ollama_url.dimmed());
    std::io::Write::flush(&mut std::io::stdout()).ok();
    match ollama::fetch_models(&cfg.ollama_url) {
        Ok(models) => {
            println!("{} ({} model(s) available)", "online".green(), models.len());
            if !ollama::has_model(&models, &cfg.active_model) {
                println!(
                    "  {} model {} is not pulled yet. Run `{}`.",
                    "Warning:".yellow(),
                    cfg.active_model.bold(),
                    format!("ollama pull {}", cfg.active_model).bold()
                );
            }
        }
        Err(e) => {
            info!(reason = %e, "ollama probe failed");
            println!("{}", "offline".yellow());
            println!(
                "  {}  Run `{}` to start a local AI.",
                "No Ollama instance detected.".dimmed(),
                "ollama serve".bold()
            );
        }
    }
}

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║       Hearth First-Run Wizard        ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up Hearth.\n");

    let mut cfg = config::Config::default();

    println!("  Which AI provider would you like to use?");
    println!("    1) Local AI via Ollama  (default, offline-first)");
    println!("    2) Cloud AI via OpenAI");
    let choice = repl::prompt_str("  Enter choice [1]: ", "1");
    if choice.trim() == "2" {
        cfg.ai_provider = config::AiProvider::OpenAI;
        cfg.active_model = config::DEFAULT_OPENAI_MODEL.to_string();
    }

    cfg.active_model = repl::prompt_str(
        &format!("  Model [{}]: ", cfg.active_model),
        &cfg.active_model,
    );

    if cfg.ai_provider == config::AiProvider::OpenAI && std::env::var("OPENAI_API_KEY").is_err() {
        cfg.openai_api_key = repl::prompt_str("  OpenAI API key (blank to use OPENAI_API_KEY later): ", "");
    }

    let memory = repl::prompt_str(
        &format!("  Memory file [{}]: ", cfg.memory_path.display()),
        &cfg.memory_path.display().to_string(),
    );
    cfg.memory_path = memory.into();

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }

    config::apply_env_overrides(&mut cfg);
    cfg
}

fn print_banner() {
    println!();
    println!("{}", r#"   __ __              __  __ "#.bold().cyan());
    println!("{}", r#"  / // /__ ___ _____/ /_/ / "#.bold().cyan());
    println!("{}", r#" / _  / -_) _ `/ __/ __/ _ \"#.bold().cyan());
    println!("{}", r#"/_//_/\__/\_,_/_/  \__/_//_/"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Hearth".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Household assistant with a memory");
    println!();
}
