use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use mongodb::{options::ClientOptions, Client};
use shuttle_runtime::{SecretStore, Secrets};
use tower_http::cors::CorsLayer;

use cinema_booking::{
    app, clock::SystemClock, config::AppConfig, store::mongo::MongoGateway, AppState,
};

#[shuttle_runtime::main]
async fn main(#[Secrets] secret_store: SecretStore) -> shuttle_axum::ShuttleAxum {
    let config = AppConfig::from_lookup(|key| secret_store.get(key))?;

    // MongoDB transactions need a replica set or a sharded cluster.
    let client_options = ClientOptions::parse(&config.database_url)
        .await
        .context("failed to parse MONGODB_URI")?;
    let client =
        Client::with_options(client_options).context("failed to initialize MongoDB client")?;

    let gateway = MongoGateway::new(client, &config.database_name);
    gateway.ping().await?;
    gateway.ensure_indexes().await?;
    tracing::info!(database = %config.database_name, "connected to MongoDB");

    let allowed_origin = config
        .app_url
        .parse::<HeaderValue>()
        .context("APP_URL is not a valid origin")?;

    let state = AppState::new(Arc::new(gateway), Arc::new(SystemClock));
    let router = app(state).layer(
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_origin(allowed_origin)
            .allow_headers([header::CONTENT_TYPE]),
    );

    Ok(router.into())
}
