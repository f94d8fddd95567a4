use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rutero_accounts::AccountService;
use rutero_api::state::{AppState, AuthConfig};
use rutero_api::{app, worker};
use rutero_booking::{
    BookingWorker, CancellationHandler, ConfirmationHandler, IntakeValidator, TransitionValidator,
};
use rutero_catalog::{LineService, RouteService, UnitService};
use rutero_store::booking_repo::{PgBookingStore, PgCancellationStore};
use rutero_store::catalog_repo::{PgLineStore, PgRouteStore, PgUnitStore};
use rutero_store::user_repo::PgUserStore;
use rutero_store::{Config, DbClient, KafkaEventBus, KafkaIntakeQueue, SmtpMailer};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rutero_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Rutero API on port {}", config.server.port);

    // Postgres Connection
    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let bookings = Arc::new(PgBookingStore::new(db.pool.clone()));
    let cancellations = Arc::new(PgCancellationStore::new(db.pool.clone()));
    let lines = Arc::new(PgLineStore::new(db.pool.clone()));
    let units = Arc::new(PgUnitStore::new(db.pool.clone()));
    let routes = Arc::new(PgRouteStore::new(db.pool.clone()));
    let users = Arc::new(PgUserStore::new(db.pool.clone()));

    // Kafka Connection
    let intake_queue = Arc::new(
        KafkaIntakeQueue::new(&config.kafka.brokers, &config.kafka.intake_topic)
            .expect("Failed to create Kafka producer"),
    );
    let event_bus = Arc::new(
        KafkaEventBus::new(&config.kafka.brokers, &config.kafka.events_topic)
            .expect("Failed to create Kafka producer"),
    );

    // SMTP Connection
    let mailer = Arc::new(SmtpMailer::new(&config.email).expect("Failed to create SMTP transport"));

    let intake = Arc::new(IntakeValidator::new(intake_queue));
    let transitions = Arc::new(TransitionValidator::new(bookings.clone(), event_bus));
    let booking_worker = Arc::new(BookingWorker::new(bookings.clone()));
    let confirmations = Arc::new(ConfirmationHandler::new(
        bookings.clone(),
        users.clone(),
        routes.clone(),
        mailer.clone(),
        config.email.customer_support.clone(),
    ));
    let cancellation_handler = Arc::new(CancellationHandler::new(
        bookings.clone(),
        cancellations.clone(),
        users.clone(),
        routes.clone(),
        mailer,
        config.email.customer_support.clone(),
    ));

    tokio::spawn(worker::run_intake_worker(
        config.kafka.brokers.clone(),
        config.kafka.intake_group.clone(),
        config.kafka.intake_topic.clone(),
        booking_worker,
    ));
    tokio::spawn(worker::run_event_worker(
        config.kafka.brokers.clone(),
        config.kafka.events_group.clone(),
        config.kafka.events_topic.clone(),
        confirmations,
        cancellation_handler,
    ));

    let app_state = AppState {
        intake,
        transitions,
        bookings,
        cancellations,
        lines: Arc::new(LineService::new(lines)),
        units: Arc::new(UnitService::new(units)),
        routes: Arc::new(RouteService::new(routes)),
        accounts: Arc::new(AccountService::new(users)),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
