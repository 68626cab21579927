//! Cookie domain rewriting reverse proxy.
//!
//! ```text
//!   Browser ──▶ listener ──▶ trace / timeout ──▶ rewrite layer ──▶ upstream
//!   Browser ◀── Set-Cookie: ...; Domain=<to> ◀── rewrite layer ◀── upstream
//! ```

use std::path::PathBuf;

use clap::Parser;

use cookie_domain_rewrite::config::loader::{load_config, ConfigError};
use cookie_domain_rewrite::config::validation::validate_config;
use cookie_domain_rewrite::config::ProxyConfig;
use cookie_domain_rewrite::lifecycle::startup;
use cookie_domain_rewrite::observability::logging;

#[derive(Parser)]
#[command(name = "cookie-domain-rewrite")]
#[command(about = "Reverse proxy that rewrites Set-Cookie domains for local hosts", long_about = None)]
struct Cli {
    /// Path to a TOML (or .json) configuration file.
    #[arg(short, long, env = "COOKIE_REWRITE_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        match_domains = ?config.rewrite.match_domains,
        replacements = config.rewrite.replacements.len(),
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
