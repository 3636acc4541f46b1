//! Modelscout report tool - probes the local inference server and prints
//! the model inventory grouped by capability.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use modelscout_client::{CapabilityResolver, Config, OllamaClient};
use modelscout_common::Capability;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("modelscout {}", VERSION);
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml is valid or use MODELSCOUT__SERVER__BASE_URL environment variables.",
            e
        )
    })?;

    let client = OllamaClient::from_config(&config);
    tracing::info!("Probing inference server at {}", client.base_url());

    let status = client.status().await;
    if !status.reachable {
        println!("Server at {} is not reachable.", client.base_url());
        println!("Start it with 'ollama serve' and try again.");
        return Ok(());
    }
    println!(
        "Server at {} is running with {} model(s).",
        client.base_url(),
        status.model_count
    );

    let resolver = CapabilityResolver::new(client);
    let index = resolver.build_index().await?;

    println!();
    println!("Models by capability:");
    for capability in Capability::ALL {
        let models = index.models_for(capability);
        println!("  {} ({})", capability, models.len());
        for model in models {
            let size_mb = model.size as f64 / (1024.0 * 1024.0);
            match model
                .details
                .as_ref()
                .and_then(|d| d.parameter_size.as_deref())
            {
                Some(parameters) => {
                    println!("    - {} [{}, {:.1} MB]", model.name, parameters, size_mb)
                }
                None => println!("    - {} [{:.1} MB]", model.name, size_mb),
            }
        }
    }

    let summary = &index.summary;
    println!();
    println!(
        "Total: {} models ({} embedding, {} vision, {} tools, {} thinking, {} chat)",
        summary.total_models,
        summary.embedding_count,
        summary.vision_count,
        summary.tools_count,
        summary.thinking_count,
        summary.chat_count
    );

    Ok(())
}
