//! toolloop CLI: entry point.
//!
//! # Commands
//!
//! - `toolloop react [PROMPT] [-i]`: iterative tool-calling agent
//! - `toolloop chat`: single-shot search agent REPL
//! - `toolloop onboard`: write the default config
//! - `toolloop status`: show configuration and provider status

mod helpers;
mod onboard;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::info;

use toolloop_agent::tools::{CalculatorTool, SearchTool};
use toolloop_agent::{ReactAgent, SingleShotAgent, ToolRegistry};
use toolloop_core::config::{load_config, Config};
use toolloop_providers::{create_provider, LlmProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// toolloop: tool-augmented chat loops for LLMs
#[derive(Parser)]
#[command(name = "toolloop", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the iterative ReAct agent on one prompt, or interactively
    React {
        /// Single prompt to run
        prompt: Option<String>,

        /// Chatbot mode (keeps one conversation across prompts)
        #[arg(short, long, default_value_t = false)]
        interactive: bool,

        /// Model to use (defaults to the configured one)
        #[arg(short, long)]
        model: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Chat with the single-shot agent (one search per message)
    Chat {
        /// Model to use (defaults to the configured one)
        #[arg(short, long)]
        model: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write the default configuration
    Onboard,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::React {
            prompt,
            interactive,
            model,
            logs,
        } => {
            init_logging(logs);
            run_react(prompt, interactive, model).await
        }
        Commands::Chat { model, logs } => {
            init_logging(logs);
            run_chat(model).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Agent commands
// ─────────────────────────────────────────────

async fn run_react(prompt: Option<String>, interactive: bool, model: Option<String>) -> Result<()> {
    if !interactive && prompt.is_none() {
        let mut cmd = Cli::command();
        if let Some(react) = cmd.find_subcommand_mut("react") {
            react.print_help()?;
        }
        return Ok(());
    }

    let config = load_config(None);
    let agent = build_react_agent(&config, model)?;

    if interactive {
        return repl::run(repl::Session::react(agent)).await;
    }

    if let Some(prompt) = prompt {
        info!("processing single prompt");
        helpers::print_thinking();
        let answer = agent.single_query(&prompt).await;
        helpers::clear_thinking();
        let answer = answer.context("agent processing failed")?;
        helpers::print_response(&answer);
    }
    Ok(())
}

async fn run_chat(model: Option<String>) -> Result<()> {
    let config = load_config(None);
    let agent = build_single_shot_agent(&config, model)?;
    repl::run(repl::Session::chat(agent)).await
}

/// Build the iterative agent from the loaded configuration.
pub fn build_react_agent(config: &Config, model: Option<String>) -> Result<ReactAgent> {
    let model = model.unwrap_or_else(|| config.agent.model.clone());
    let provider = build_provider(config, &model)?;

    Ok(ReactAgent::new(
        provider,
        build_tools(config),
        Some(model),
        Some(config.agent.max_tool_iterations),
        Some(request_config(config)),
    ))
}

/// Build the single-shot agent from the loaded configuration.
pub fn build_single_shot_agent(config: &Config, model: Option<String>) -> Result<SingleShotAgent> {
    let model = model.unwrap_or_else(|| config.agent.model.clone());
    let provider = build_provider(config, &model)?;

    Ok(SingleShotAgent::new(
        provider,
        build_tools(config),
        Some(model),
        Some(config.agent.memory_window),
        Some(request_config(config)),
    ))
}

fn build_provider(config: &Config, model: &str) -> Result<Arc<dyn LlmProvider>> {
    let providers_map = config.providers.to_map();
    let provider = create_provider(model, &providers_map)
        .with_context(|| format!("cannot run model '{model}'"))?;
    Ok(Arc::new(provider))
}

/// The tools both agents get: web search and the calculator.
fn build_tools(config: &Config) -> Arc<ToolRegistry> {
    let search = &config.tools.search;
    let search_key = Some(search.api_key.clone()).filter(|k| !k.is_empty());

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(
        SearchTool::new(search_key).with_api_base(search.api_base.as_str()),
    ));
    tools.register(Arc::new(CalculatorTool));
    Arc::new(tools)
}

fn request_config(config: &Config) -> LlmRequestConfig {
    LlmRequestConfig {
        max_tokens: config.agent.max_tokens,
        temperature: config.agent.temperature,
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("toolloop=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
