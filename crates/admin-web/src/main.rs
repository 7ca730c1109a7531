//! HTTP API for the cafeteria lunch vote.
//!
//! Serves the public vote and menu endpoints and the password-protected admin
//! endpoints (stats, exports, menu upload, email reports), and runs the
//! automatic report scheduler.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use cafeteria_core::{LocalStore, MenuResolver, RemoteStore, Repository, TemplateMailer};
use database::Database;
use docstore::{DocStoreClient, DocStoreConfig};
use mailer::{MailerClient, MailerConfig};
use media_host::{MediaClient, MediaConfig};
use reporter::{ReportScheduler, Reporter};
use tokio::signal::ctrl_c;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::{AppState, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting cafeteria server");

    // Local fallback store
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Remote collaborators
    let docstore = DocStoreClient::new(DocStoreConfig::from_env()?)?;
    let media = MediaClient::new(MediaConfig::from_env()?)?;
    let mail = MailerClient::new(MailerConfig::from_env()?)?;
    if !mail.is_configured() {
        warn!("Email service not configured; reports are disabled");
    }
    if !media.config().is_configured() {
        warn!("File host not configured; menu uploads are disabled");
    }

    let remote: Arc<dyn RemoteStore> = Arc::new(docstore);
    let local: Arc<dyn LocalStore> = Arc::new(db.clone());
    let mailer: Arc<dyn TemplateMailer> = Arc::new(mail);

    let repo = Repository::new(remote.clone(), local);
    let mut menus = MenuResolver::new(remote);
    if let Some(url) = &config.default_menu_url {
        menus = menus.with_default_url(url.clone());
    }

    let reporter = Reporter::new(repo.clone(), mailer).with_send_delay(config.send_delay);
    let scheduler = ReportScheduler::new(reporter).with_interval(config.scheduler_interval);

    if repo.load_schedule().await.enabled {
        scheduler.arm();
    }

    let mut settings = Settings::new(config.admin_password.clone());
    settings.voting_window = config.voting_window;
    settings.retention_days = config.retention_days;

    // Build application state
    let state = AppState::new(repo, menus, media, scheduler.clone(), settings);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(auth::ADMIN_PASSWORD_HEADER)]);

    // Build router
    let app = routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "Cafeteria server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.disarm();
    db.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
