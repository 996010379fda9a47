use std::process;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod server;
mod tools;
mod utils;

use config::ServiceConfig;
use tools::BulletinContext;
use utils::archive_lookup::ArchiveConfig;
use utils::document_download::HttpDocumentDownloader;
use utils::publication_locator::PublicationLocator;
use utils::scrape_proxy::ScrapeProxyClient;

/// Startup summary: service name, then one aligned row per setting.
fn banner(config: &ServiceConfig) -> String {
    let rows = [
        ("listening on", format!("http://{}", config.bind)),
        ("scrape proxy", config.scrape_endpoint.to_string()),
        ("archive", config.archive_base.to_string()),
        ("max pages", config.max_pages.to_string()),
    ];
    let rule = "─".repeat(48);

    let mut out = format!("{rule}\n Digilaw: Bulletin Officiel API v{}\n{rule}\n", env!("CARGO_PKG_VERSION"));
    for (label, value) in rows {
        out.push_str(&format!(" {:<13} {}\n", label, value));
    }
    out.push_str(&rule);
    out
}

fn build_context(config: &ServiceConfig) -> anyhow::Result<BulletinContext> {
    let fetcher = ScrapeProxyClient::new(config.scrape_endpoint.clone())?;
    info!("Scrape proxy: {}", fetcher.endpoint());

    let archive = ArchiveConfig::new(config.archive_base.as_str());
    info!("Bulletin archive: {}", archive.base_url());

    Ok(BulletinContext {
        locator: PublicationLocator::new(Arc::new(fetcher), archive),
        downloader: Arc::new(HttpDocumentDownloader::new()?),
        max_pages: config.max_pages,
    })
}

#[tokio::main]
async fn main() {
    let matches = config::cli().get_matches();

    // Logs go to stderr; level from RUST_LOG, else info (error in quiet mode)
    let default_level = if matches.get_flag("quiet") { "error" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = match ServiceConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            process::exit(1);
        }
    };

    let ctx = match build_context(&config) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!("Failed to initialize HTTP clients: {:#}", e);
            process::exit(1);
        }
    };

    if !config.quiet {
        eprintln!("\n{}\n", banner(&config));
    }

    info!("Starting HTTP server (max pages: {})...", config.max_pages);

    if let Err(e) = server::serve(config.bind, ctx).await {
        error!("Server error: {:#}", e);
        process::exit(1);
    }
}
