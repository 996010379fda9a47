use std::env;
use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use url::Url;

use crate::utils::archive_lookup::DEFAULT_ARCHIVE_BASE;
use crate::utils::pdf::DEFAULT_MAX_PAGES;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_SCRAPE_ENDPOINT: &str = "http://127.0.0.1:3001/api/scrape";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub scrape_endpoint: Url,
    pub archive_base: Url,
    pub max_pages: u32,
    pub quiet: bool,
}

pub fn cli() -> Command {
    Command::new("digilaw-bulletin")
        .version(env!("CARGO_PKG_VERSION"))
        .about("HTTP API returning the text of the latest Bulletin Officiel")
        .long_about(
            "Serves the following endpoints:\n\
            - GET /api/Digilaw/Page?page=N: text of one page of the latest bulletin\n\
            - GET /api/Digilaw/Companies: text of the first pages of the latest bulletin\n\
            - GET /api/Digilaw/health: liveness check",
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDR")
                .help("Socket address to listen on [env: BULLETIN_BIND]")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("scrape-endpoint")
                .long("scrape-endpoint")
                .value_name("URL")
                .help("Rendering proxy endpoint taking a `url` query parameter [env: SCRAPE_PROXY_URL]")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("archive-base")
                .long("archive-base")
                .value_name("URL")
                .help("Base URL of the bulletin archive [env: BULLETIN_ARCHIVE_BASE]")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("max-pages")
                .long("max-pages")
                .value_name("N")
                .help("Pages returned by the Companies endpoint [env: BULLETIN_MAX_PAGES]")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Suppress the startup banner and log errors only")
                .action(clap::ArgAction::SetTrue),
        )
}

impl ServiceConfig {
    /// Command line first, then environment, then defaults.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Self::resolve(matches, |key| env::var(key).ok())
    }

    fn resolve(matches: &ArgMatches, lookup_env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let setting = |arg: &str, env_key: &str, default: &str| -> String {
            matches
                .get_one::<String>(arg)
                .cloned()
                .or_else(|| lookup_env(env_key))
                .unwrap_or_else(|| default.to_string())
        };

        let bind_raw = setting("bind", "BULLETIN_BIND", DEFAULT_BIND);
        let bind = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address '{}'", bind_raw))?;

        let endpoint_raw = setting("scrape-endpoint", "SCRAPE_PROXY_URL", DEFAULT_SCRAPE_ENDPOINT);
        let scrape_endpoint = parse_http_url(&endpoint_raw, "scrape endpoint")?;

        let archive_raw = setting("archive-base", "BULLETIN_ARCHIVE_BASE", DEFAULT_ARCHIVE_BASE);
        let archive_base = parse_http_url(&archive_raw, "archive base")?;

        let max_pages_raw = setting(
            "max-pages",
            "BULLETIN_MAX_PAGES",
            &DEFAULT_MAX_PAGES.to_string(),
        );
        let max_pages = match max_pages_raw.parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => return Err(anyhow!("invalid max pages '{}': expected a positive integer", max_pages_raw)),
        };

        Ok(Self {
            bind,
            scrape_endpoint,
            archive_base,
            max_pages,
            quiet: matches.get_flag("quiet"),
        })
    }
}

fn parse_http_url(raw: &str, what: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid {} '{}'", what, raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("invalid {} '{}': unsupported scheme '{}'", what, raw, other)),
    }
}
