use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trailview_core::files::PanoramaFiles;
use trailview_core::lifecycle::PanoramaLifecycle;
use trailview_core::metadata::ExifMetadataExtractor;
use trailview_core::sequence::SequenceAssembler;
use trailview_core::store::PanoramaStore;
use trailview_core::transcode::JpegTranscoder;

use trailview_api::config::ServerConfig;
use trailview_api::router::build_app_router;
use trailview_api::state::AppState;
use trailview_db::PgPanoramaStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trailview_api=debug,trailview_core=debug,trailview_db=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = trailview_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    trailview_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    trailview_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Image storage ---
    let transcoder = JpegTranscoder::new(Duration::from_secs(config.resize_timeout_secs));
    let files = Arc::new(PanoramaFiles::new(
        &config.raw_uploads_dir,
        &config.pano_dir,
        Arc::new(transcoder),
    ));
    files
        .ensure_dirs()
        .await
        .expect("Failed to create image directories");
    tracing::info!(
        pending = %config.raw_uploads_dir.display(),
        published = %config.pano_dir.display(),
        "Image directories ready"
    );

    // --- Domain services ---
    let store: Arc<dyn PanoramaStore> = Arc::new(PgPanoramaStore::new(pool));
    let lifecycle = Arc::new(PanoramaLifecycle::new(
        Arc::clone(&store),
        files,
        Arc::new(ExifMetadataExtractor),
    ));
    let sequences = Arc::new(SequenceAssembler::new(store));

    // --- App state ---
    let state = AppState {
        lifecycle,
        sequences,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
