//! CLI definitions for llm-factory

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "llm-factory")]
#[command(about = "Inspect and exercise OpenAI / Azure OpenAI client configuration", long_about = None)]
pub struct Cli {
    /// Provider table file (default: <config_dir>/llm-factory/config.toml)
    #[arg(long, global = true)]
    pub providers: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which client a provider resolves to
    Show {
        /// Provider name (e.g. openai, azure, groq); omitted means openai
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List the known providers
    Providers,

    /// Send a chat completion request
    Chat {
        /// Provider name; omitted means openai
        #[arg(short, long)]
        provider: Option<String>,

        /// Model (or Azure deployment) to use
        #[arg(short, long, default_value = "gpt-4o-mini")]
        model: String,

        /// System prompt
        #[arg(long)]
        system: Option<String>,

        /// Request a streaming response and print the raw event stream
        #[arg(short, long)]
        stream: bool,

        /// Show token usage statistics after response
        #[arg(long)]
        token_stats: bool,

        /// Query text
        query: Vec<String>,
    },
}
