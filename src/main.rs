mod api;
mod config;
mod domain;
mod storage;
mod sync;
mod tracker_client;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use config::Config;
use migration::MigratorTrait;
use poem::{
    EndpointExt, Route, Server,
    listener::TcpListener,
    middleware::{Cors, Tracing as PoemTracing},
};
use poem_openapi::OpenApiService;
use sea_orm::Database;
use storage::SqliteStore;
use sync::ChapterTrackSync;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};
use tracker_client::TrackerClient;

type SyncResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> SyncResult<()> {
    // Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,poem=info,reqwest=warn,h2=warn,sea_orm=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting chapter track sync"
    );
    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let db_conn = Database::connect(&config.db_connection_string)
        .await
        .with_context(|| "Failed to connect to database")?;

    migration::Migrator::up(&db_conn, None)
        .await
        .with_context(|| "Failed to run database migrations")?;

    let client =
        TrackerClient::new(&config.tracker_base_url)?.with_api_key(&config.tracker_api_key);
    let has_api_key = !config.tracker_api_key.is_empty();
    tracing::info!(
        tracker_base = %config.tracker_base_url,
        has_api_key,
        policy = ?config.mark_read_policy,
        "configured tracker client"
    );

    let client = Arc::new(client);
    let store = Arc::new(SqliteStore::new(Arc::new(db_conn)));
    let sync = Arc::new(ChapterTrackSync::new(
        client.clone(),
        store.clone(),
        store,
    ));

    run_poem(client, sync, Arc::new(config)).await?;
    Ok(())
}

pub async fn run_poem(
    client: Arc<TrackerClient>,
    sync: Arc<ChapterTrackSync>,
    config: Arc<Config>,
) -> SyncResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let bind_addr = config.bind_addr.clone();
    let api = api::ProgressApi {
        client,
        sync,
        config,
    };
    let api_service = OpenApiService::new(api, "Chapter Track Sync API", version)
        .server(format!("http://{}", bind_addr));
    let ui = api_service.rapidoc();
    let spec = api_service.spec();
    let route = Route::new()
        .nest("/", api_service)
        .nest("/ui", ui)
        .nest("/spec", poem::endpoint::make_sync(move |_| spec.clone()))
        .with(Cors::new())
        .with(PoemTracing);

    tracing::info!(%bind_addr, "starting HTTP server");
    Server::new(TcpListener::bind(bind_addr)).run(route).await?;
    Ok(())
}
