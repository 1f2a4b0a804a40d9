use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use axum::Router;
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

use services::AppState;
use services::index_client::IndexClient;
use services::ingest_service::IngestService;
use services::intent_client::IntentClient;
use services::search_service::SearchService;
use services::signed_client::SignedClient;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting photo-search with config: {:?}", cfg);

    // --- Resolve ambient AWS credentials and SDK clients ---
    let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(cfg.region.clone()))
        .load()
        .await;
    let credentials = aws_cfg
        .credentials_provider()
        .context("no AWS credentials provider available in the environment")?;

    let rekognition = aws_sdk_rekognition::Client::new(&aws_cfg);
    let s3 = aws_sdk_s3::Client::new(&aws_cfg);

    // --- Initialize core services ---
    let signer = SignedClient::new(cfg.region.clone(), credentials);
    let index = IndexClient::new(signer.clone(), cfg.index_endpoint.clone());
    let intent = cfg.lex_bot().map(|bot| {
        IntentClient::new(
            signer.clone(),
            format!("https://runtime-v2-lex.{}.amazonaws.com", cfg.region),
            bot,
        )
    });
    if intent.is_none() {
        tracing::warn!(
            "LEX_BOT_ID/LEX_BOT_ALIAS_ID not set; queries will use stop-word keyword extraction only"
        );
    }

    let state = AppState {
        ingest: IngestService::new(rekognition, s3, index.clone()),
        search: SearchService::new(intent, index.clone(), cfg.photos_bucket.clone()),
        index,
    };

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
