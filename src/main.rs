use std::path::Path;

use clap::Parser;
use scrubmate::cli::*;
use scrubmate::models::KnowledgeRecord;
use scrubmate::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        scrubmate::logging::init_logging_with_level("debug")?;
    } else {
        scrubmate::logging::init_logging_with_config(&config)?;
    }
    info!(
        "Configuration loaded ({})",
        cli.config
            .as_deref()
            .map_or_else(|| "default search path".to_string(), |p: &Path| p.display().to_string())
    );

    let result = match cli.command {
        Commands::Serve { host, port, cors } => handle_serve_api(&config, host, port, cors).await,
        Commands::Ask { question, raw } => handle_ask_command(&config, &question, raw).await,
        Commands::Match {
            question,
            threshold,
        } => handle_match_command(&config, &question, threshold).await,
        Commands::Expand { query } => handle_expand_command(&config, &query).await,
        Commands::Add {
            question,
            answer,
            image,
            surgeon,
            room,
            surgery,
            devices,
            tools,
        } => {
            let record = KnowledgeRecord {
                image_filename: image.filter(|i| !i.trim().is_empty()),
                surgeon,
                room,
                surgery_name: surgery,
                surgery_devices: devices,
                surgery_tools: tools,
                ..KnowledgeRecord::new(question, answer)
            };
            handle_add_command(&config, record).await
        }
        Commands::List { limit, input } => handle_list_command(&config, limit, input).await,
        Commands::Config => handle_config_command(&config).await,
    };

    if let Err(e) = &result {
        print_error(&e.to_string());
    }
    result?;

    Ok(())
}
