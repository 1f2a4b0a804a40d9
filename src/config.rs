use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub index_endpoint: String,
    pub region: String,
    pub lex_bot_id: Option<String>,
    pub lex_bot_alias_id: Option<String>,
    pub photos_bucket: String,
}

/// Intent-recognition bot coordinates. Only built when both halves are
/// configured; otherwise the query pipeline skips recognition entirely.
#[derive(Debug, Clone)]
pub struct LexBot {
    pub bot_id: String,
    pub bot_alias_id: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Photo search over label detection and a search index")]
pub struct Args {
    /// Host to bind to (overrides PHOTO_SEARCH_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PHOTO_SEARCH_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Search index endpoint URL (overrides OPENSEARCH_ENDPOINT)
    #[arg(long)]
    pub index_endpoint: Option<String>,

    /// AWS region used for request signing (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Intent-recognition bot id (overrides LEX_BOT_ID)
    #[arg(long)]
    pub lex_bot_id: Option<String>,

    /// Intent-recognition bot alias id (overrides LEX_BOT_ALIAS_ID)
    #[arg(long)]
    pub lex_bot_alias_id: Option<String>,

    /// Bucket assumed for hits without one (overrides PHOTOS_BUCKET)
    #[arg(long)]
    pub photos_bucket: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::merge(args)
    }

    fn merge(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("PHOTO_SEARCH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PHOTO_SEARCH_PORT") {
            Ok(value) => Some(
                value
                    .parse::<u16>()
                    .with_context(|| format!("parsing PHOTO_SEARCH_PORT value `{}`", value))?,
            ),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading PHOTO_SEARCH_PORT"),
        };

        // The endpoint and the fallback bucket are deployment-specific;
        // there is no sensible literal default for either.
        let index_endpoint = args
            .index_endpoint
            .or_else(|| non_empty_env("OPENSEARCH_ENDPOINT"))
            .context("search index endpoint missing: set OPENSEARCH_ENDPOINT or pass --index-endpoint")?
            .trim_end_matches('/')
            .to_string();
        let photos_bucket = args
            .photos_bucket
            .or_else(|| non_empty_env("PHOTOS_BUCKET"))
            .context("photos bucket missing: set PHOTOS_BUCKET or pass --photos-bucket")?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.or(env_port).unwrap_or(3000),
            index_endpoint,
            region: args
                .region
                .or_else(|| non_empty_env("AWS_REGION"))
                .unwrap_or_else(|| "us-east-1".into()),
            lex_bot_id: args.lex_bot_id.or_else(|| non_empty_env("LEX_BOT_ID")),
            lex_bot_alias_id: args
                .lex_bot_alias_id
                .or_else(|| non_empty_env("LEX_BOT_ALIAS_ID")),
            photos_bucket,
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn lex_bot(&self) -> Option<LexBot> {
        match (&self.lex_bot_id, &self.lex_bot_alias_id) {
            (Some(bot_id), Some(bot_alias_id)) => Some(LexBot {
                bot_id: bot_id.clone(),
                bot_alias_id: bot_alias_id.clone(),
            }),
            _ => None,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
