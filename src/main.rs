use anyhow::Context;
use tokio::net::TcpListener;

use user_registry::configuration::get_configuration;
use user_registry::startup::{get_app_state, run};
use user_registry::telemetry::{get_subscriber, initialize_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("user-registry".into(), "info".into(), std::io::stdout);
    initialize_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration")?;

    let app_state = get_app_state(&configuration)
        .await
        .context("Failed to connect to Postgres")?;
    sqlx::migrate!("./migrations")
        .run(&app_state.pool)
        .await
        .context("Failed to migrate the database")?;

    let listener = TcpListener::bind(configuration.application.address())
        .await
        .context("Failed to bind a port for application")?;
    tracing::info!("Server running at http://{}", listener.local_addr()?);

    run(listener, app_state, &configuration.application.static_dir)
        .await
        .context("Failed to run the application")
}
