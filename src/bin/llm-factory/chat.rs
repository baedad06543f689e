//! Chat command implementation

use anyhow::Result;
use llm_factory::{create_client, ClientConfig, ClientEnvironment, EnvResolver, Message};
use std::io::{self, Read, Write};

#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &ClientConfig,
    env: &ClientEnvironment,
    resolver: &EnvResolver,
    model: &str,
    system: Option<String>,
    stream: bool,
    token_stats: bool,
    query: Vec<String>,
) -> Result<()> {
    let query = if query.is_empty() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        input
    } else {
        query.join(" ")
    };

    if query.trim().is_empty() {
        anyhow::bail!("no query given (pass it as arguments or on stdin)");
    }

    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(query));

    let client = create_client(config, env, resolver);

    // Use tokio runtime for async operations
    tokio::runtime::Runtime::new()?.block_on(async {
        if stream {
            let mut response = client.chat_stream_raw(&messages, model).await?;
            let mut stdout = io::stdout();
            while let Some(chunk) = response.chunk().await? {
                stdout.write_all(&chunk)?;
                stdout.flush()?;
            }
        } else {
            let (response, usage) = client.chat(&messages, model).await?;
            println!("{}", response);

            if token_stats {
                println!();
                println!("=== Token Stats ===");
                println!("Prompt tokens: {}", usage.prompt_tokens);
                println!("Completion tokens: {}", usage.completion_tokens);
                println!("Total tokens: {}", usage.total_tokens);
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}
