use std::path::Path;
use std::time::Duration;

use axum::{
    extract::{FromRef, MatchedPath},
    http::Request,
    routing::get,
    Router,
};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::configuration::Settings;
use crate::routes::{check_health, create_user, get_user, list_users};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

pub async fn get_app_state(configuration: &Settings) -> Result<AppState, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(configuration.database.max_connections)
        .acquire_timeout(Duration::from_secs(2))
        .connect(configuration.database.connection_string().expose_secret())
        .await?;

    Ok(AppState { pool })
}

pub async fn run(
    listener: TcpListener,
    app_state: AppState,
    static_dir: impl AsRef<Path>,
) -> Result<(), std::io::Error> {
    let app = router(app_state, static_dir);

    axum::serve(listener, app.into_make_service()).await
}

pub fn router(app_state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", get(get_user))
        .route("/health_check", get(check_health))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(app_state)
        .layer(
            // Refer to https://github.com/tokio-rs/axum/blob/main/examples/tracing-aka-logging/Cargo.toml
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);
                tracing::info_span!(
                    "Starting HTTP request",
                    method = ?request.method(),
                    uri = %request.uri(),
                    path,
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
}
