use clap::Parser;
use promptmgr::cli::Cli;
use promptmgr::commands;
use promptmgr::core::config::{load_config, ClientConfig};
use promptmgr::core::logging::init_logging;
use promptmgr::PromptManager;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("• {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(if cli.global.verbose { "debug" } else { "warn" });

    let mut explicit = ClientConfig::new();
    explicit.base_url = cli.global.url.clone();
    explicit.environment = cli.global.environment.clone();

    let config = load_config(explicit, cli.global.config.as_deref()).map_err(|e| e.to_string())?;
    let client = PromptManager::new(config).map_err(|e| e.to_string())?;

    commands::dispatch(cli.command, &client).await
}
