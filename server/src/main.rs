use anyhow::Context;
use expodesk_auth::Authenticator;
use expodesk_backend_api::{build_router, AppState};
use expodesk_config::load as load_config;
use expodesk_database::initialize_database;
use expodesk_mailer::Mailer;
use expodesk_vision::VisionClient;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("starting Expodesk backend");

    let config = load_config().context("failed to load configuration")?;

    let db_pool = initialize_database(&config.database)
        .await
        .context("failed to prepare database")?;

    let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());
    info!(
        line_login = authenticator.line_enabled(),
        "authentication subsystem ready"
    );

    let mailer = Mailer::new(&config.mailer);
    if !mailer.configured() {
        info!("email provider not configured, dispatches will be logged only");
    }

    let vision = VisionClient::new(&config.vision);
    if !vision.configured() {
        info!("vision model not configured, document verification disabled");
    }

    let state = AppState::new(db_pool, authenticator, mailer, vision);
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    async {
        if let Err(error) = signal::ctrl_c().await {
            error!(?error, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
    }
}
