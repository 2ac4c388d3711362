use std::net::SocketAddr;
use std::sync::Arc;

use tripsage_api::llm::{FallbackSummaryGenerator, HttpSummaryGenerator, SummaryGenerator};
use tripsage_api::mailer::{LogMailer, Mailer, SmtpMailer};
use tripsage_api::{app, AppState};
use tripsage_core::token::TokenService;
use tripsage_store::{DbClient, PgBookingRepository, PgSummaryRepository, PgUserRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripsage_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = tripsage_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting TripSage API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let mailer: Arc<dyn Mailer> = if config.smtp.enabled {
        Arc::new(SmtpMailer::new(&config.smtp).expect("Failed to build SMTP transport"))
    } else {
        tracing::info!("SMTP disabled, using logging mailer");
        Arc::new(LogMailer)
    };

    let generator: Arc<dyn SummaryGenerator> = if config.llm.api_key.is_empty() {
        tracing::info!("No LLM API key configured, using fallback summary generator");
        Arc::new(FallbackSummaryGenerator)
    } else {
        Arc::new(HttpSummaryGenerator::new(&config.llm).expect("Failed to build LLM client"))
    };

    let app_state = AppState {
        users: Arc::new(PgUserRepository::new(db.pool.clone())),
        bookings: Arc::new(PgBookingRepository::new(db.pool.clone())),
        summaries: Arc::new(PgSummaryRepository::new(db.pool.clone())),
        tokens: Arc::new(TokenService::new(
            config.auth.jwt_secret.clone(),
            config.auth.jwt_expiration_seconds,
        )),
        mailer,
        generator,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
