use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use noc_route_classifier::{AppResult, Classifier};
use noc_route_classifier::api::rest::{AppState, create_api_router};
use noc_route_classifier::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialize logging; RUST_LOG directives refine the configured level
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(path) = &config.loaded_from {
        tracing::info!("Loaded configuration from: {}", path.display());
    }

    let classifier = Classifier::new(config.classifier.clone());

    if let Some(input) = &config.input {
        classify_file(&classifier, input, &config.source_ip, config.pretty)?;
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.bind_address, config.port))?;

    let state = Arc::new(AppState::new(classifier));
    let app = create_api_router(state).into_make_service();

    tracing::info!("Route classifier listening on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  http://{}/api/health", addr);
    tracing::info!("  POST http://{}/api/classify", addr);
    tracing::info!("  GET  http://{}/api/vcn-table", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Classify one captured dump and print the result as JSON
fn classify_file(
    classifier: &Classifier,
    input: &Path,
    source_ip: &str,
    pretty: bool,
) -> AppResult<()> {
    let raw = if input == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(input).inspect_err(|e| {
            tracing::error!("failed to read {}: {}", input.display(), e);
        })?
    };

    let classification = classifier.classify_bytes(&raw, source_ip)?;

    let output = if pretty {
        serde_json::to_string_pretty(&classification)?
    } else {
        serde_json::to_string(&classification)?
    };
    println!("{}", output);

    Ok(())
}
