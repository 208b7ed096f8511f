use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skybook_api::{app, AppState};
use skybook_core::{FlightCatalog, FlightSource};
use skybook_lookup::{
    AirportDirectory, AirportsSource, AviationStack, CatalogSource, LookupChain, SampleSource,
};
use skybook_store::{DbClient, PgBookingRepository, PgFlightRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "skybook_api=debug,skybook_store=debug,skybook_lookup=debug,tower_http=debug,axum::rejection=trace".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skybook_store::app_config::Config::load().expect("Failed to load config");
    info!("Starting SkyBook API on port {}", config.server.port);

    let db = Arc::new(
        DbClient::new(&config.database)
            .await
            .expect("Failed to connect to Postgres"),
    );
    db.migrate().await.expect("Failed to run migrations");

    let flights = Arc::new(PgFlightRepository::new(db.pool.clone()));
    let bookings = Arc::new(PgBookingRepository::new(db.pool.clone()));

    let timeout = Duration::from_secs(config.aviationstack.timeout_seconds);
    let external = match config.aviationstack.api_key.as_deref() {
        Some(key) => match AviationStack::new(&config.aviationstack.base_url, key, timeout) {
            Ok(client) => Some(client),
            Err(err) => {
                warn!(error = %err, "failed to build AviationStack client, external tier disabled");
                None
            }
        },
        None => {
            info!("no AviationStack API key configured, external tier disabled");
            None
        }
    };

    // Lookup tiers, tried in order: external API, catalog, samples.
    let mut sources: Vec<Arc<dyn FlightSource>> = Vec::new();
    if let Some(client) = external.clone() {
        sources.push(Arc::new(client));
    }
    sources.push(Arc::new(CatalogSource::new(
        Arc::clone(&flights) as Arc<dyn FlightCatalog>
    )));
    sources.push(Arc::new(SampleSource));

    let state = AppState {
        db: db.clone(),
        flights,
        bookings,
        lookup: Arc::new(LookupChain::new(sources)),
        airports: Arc::new(AirportDirectory::new(
            external.map(|client| Arc::new(client) as Arc<dyn AirportsSource>),
        )),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Drain the pool after the listener stops accepting.
    db.close().await;
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
