//! Show command implementation

use llm_factory::{create_client, redact_api_key, ClientConfig, ClientEnvironment, EnvResolver, ProviderKind};

/// Print the client a provider resolves to
pub fn run(config: &ClientConfig, env: &ClientEnvironment, resolver: &EnvResolver) {
    let client = create_client(config, env, resolver);

    println!("Provider: {}", config.lookup_name());
    println!(
        "  Variant: {}",
        match client.kind() {
            ProviderKind::Azure => "Azure OpenAI",
            ProviderKind::Standard => "OpenAI",
        }
    );
    println!("  Base URL: {}", client.base_url().unwrap_or("<unset>"));
    println!("  API Key: {}", redact_api_key(client.api_key()));
    if let Some(version) = client.api_version() {
        println!("  API Version: {}", version);
    }
    println!("  Timeout: {:?}", client.timeout());
    if client.default_headers().is_empty() {
        println!("  Headers: (none)");
    } else {
        println!("  Headers:");
        for (name, value) in client.default_headers() {
            println!("    {}: {}", name, value);
        }
    }

    if client.api_key().is_none() {
        println!();
        match resolver.table().get(config.lookup_name()) {
            Some(info) => println!("No API key found; set {}", info.env_key),
            None => println!(
                "No API key found; set {}_API_KEY or OPENAI_API_KEY",
                config.lookup_name().to_uppercase()
            ),
        }
    }
}

/// Print the provider table
pub fn list(resolver: &EnvResolver) {
    for (id, info) in resolver.table().iter() {
        println!("{:<12} {:<14} {:<28} {}", id, info.name, info.env_key, info.base_url);
    }
}
