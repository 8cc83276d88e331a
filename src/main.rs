use rusty_lending::{
    adapters::postgres::{PostgresBookRepository, PostgresMemberRepository},
    api::{handlers::AppState, router::create_router},
    application::{LibraryFacade, ServiceDependencies},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_lending=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection URL
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/library".into());

    tracing::info!("Database URL: {}", database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters
    let book_repo = Arc::new(PostgresBookRepository::new(pool.clone()));
    let member_repo = Arc::new(PostgresMemberRepository::new(pool.clone()));

    // Create service dependencies and the facade
    let deps = ServiceDependencies::new(book_repo, member_repo);
    let facade = LibraryFacade::new(deps);

    // Create application state
    let app_state = Arc::new(AppState { facade });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
