use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use once_cell::sync::Lazy;
use reqwest::{Client, Method, Response};
use secrecy::ExposeSecret;
use sqlx::{Connection, Executor, PgConnection, Pool, Postgres};
use tokio::net::TcpListener;
use uuid::Uuid;

use user_registry::{configuration, startup, telemetry};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        telemetry::initialize_subscriber(subscriber);
    } else {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        telemetry::initialize_subscriber(subscriber);
    };
});

pub struct App {
    pub address: SocketAddr,
    pub client: Client,
    pub pool: Pool<Postgres>,
}

impl App {
    pub async fn new() -> Self {
        Lazy::force(&TRACING);

        // configure listener
        let listener = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to start an test application");
        let address = listener.local_addr().unwrap();

        // get configuration and randomise database name
        let mut configuration =
            configuration::get_configuration().expect("Failed to read configuration");
        configuration.database.database = Uuid::new_v4().to_string();

        // initialise randomise database
        App::initialise_database(&configuration).await;

        let app_state = startup::get_app_state(&configuration)
            .await
            .expect("Failed to connect to the test database");
        let pool = app_state.pool.clone();

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to migrate the database");

        tokio::spawn(startup::run(
            listener,
            app_state,
            configuration.application.static_dir,
        ));

        let client = Client::new();

        App {
            address,
            client,
            pool,
        }
    }

    async fn initialise_database(configuration: &configuration::Settings) {
        let mut connection = PgConnection::connect(
            configuration
                .database
                .connection_string_without_database()
                .expose_secret(),
        )
        .await
        .expect("Failed to connect to Postgres");

        connection
            .execute(format!(r#"CREATE DATABASE "{}";"#, configuration.database.database).as_str())
            .await
            .expect("Failed to create database.");
    }
}

impl App {
    pub fn build_request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("http://{}{}", self.address, path);

        if method == Method::GET {
            self.client.get(url)
        } else if method == Method::POST {
            self.client.post(url)
        } else {
            panic!("No implementation for this request method {}", method)
        }
    }

    pub async fn get(&self, path: &str) -> Response {
        self.build_request(Method::GET, path)
            .send()
            .await
            .unwrap()
    }

    pub async fn get_health_check(&self) -> Response {
        self.get("/health_check").await
    }

    pub async fn post_users(&self, body: &serde_json::Value) -> Response {
        self.build_request(Method::POST, "/api/users")
            .json(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn get_users(&self) -> Response {
        self.get("/api/users").await
    }

    pub async fn get_user(&self, id: impl std::fmt::Display) -> Response {
        self.get(&format!("/api/users/{}", id)).await
    }
}
