//! llm-factory binary entry point

use anyhow::Result;

mod chat;
mod cli;
mod show;

use clap::Parser;
use cli::{Cli, Commands};
use llm_factory::{ClientConfig, ClientEnvironment, EnvResolver, ProviderTable};

fn load_table(path: Option<&str>) -> Result<ProviderTable> {
    match path {
        Some(path) => ProviderTable::load(path),
        None => ProviderTable::load_with_default(),
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let table = load_table(cli.providers.as_deref())?;
    let resolver = EnvResolver::from_env(table);
    let env = ClientEnvironment::from_env();

    match cli.command {
        Commands::Show { provider } => {
            show::run(&ClientConfig::new(provider), &env, &resolver);
        }
        Commands::Providers => {
            show::list(&resolver);
        }
        Commands::Chat {
            provider,
            model,
            system,
            stream,
            token_stats,
            query,
        } => {
            let config = ClientConfig::new(provider);
            chat::run(&config, &env, &resolver, &model, system, stream, token_stats, query)?;
        }
    }

    Ok(())
}
