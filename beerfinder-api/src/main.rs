use socketioxide::SocketIo;
use std::sync::Arc;

use beerfinder_api::config::AppConfig;
use beerfinder_api::store::PgStore;
use beerfinder_api::{router, socket, AppState};
use beerfinder_shared::clients::db::create_pool;
use beerfinder_shared::clients::storage::S3PhotoStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    beerfinder_shared::middleware::init_tracing("beerfinder-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics_handle = beerfinder_shared::middleware::init_metrics()?;

    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    tracing::info!(pool_size = config.db_pool_size, "database pool ready");

    let photos = S3PhotoStorage::new(
        &config.storage_endpoint,
        &config.storage_access_key,
        &config.storage_secret_key,
        &config.storage_bucket,
        &config.storage_public_url,
    )
    .await;

    // REST handlers and socket handlers share the same io handle.
    let (sio_layer, io) = SocketIo::builder().build_layer();

    let state = Arc::new(AppState {
        store: PgStore::new(pool),
        config,
        photos,
        io: io.clone(),
        metrics_handle,
    });

    io.ns("/", {
        let state = state.clone();
        move |socket: socketioxide::extract::SocketRef| {
            let state = state.clone();
            async move {
                socket::handlers::on_connect_with_state(socket, state).await;
            }
        }
    });

    let app = router(state).layer(sio_layer);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "beerfinder-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
