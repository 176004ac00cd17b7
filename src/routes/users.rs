use std::fmt::Debug;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use sqlx::{Pool, Postgres};

use crate::domain::{NewUser, User, UserEmail, UserName};
use crate::routes::error_chain_fmt;

#[derive(Debug, Deserialize)]
pub struct BodyData {
    name: String,
    email: String,
}

impl TryFrom<BodyData> for NewUser {
    type Error = String;

    fn try_from(body: BodyData) -> Result<Self, Self::Error> {
        let name = UserName::parse(body.name)?;
        let email = UserEmail::parse(body.email)?;

        Ok(Self { name, email })
    }
}

#[tracing::instrument(
    name = "Adding a new user",
    skip(pool, body),
    fields(
        user_email = %body.email,
        user_name = %body.name,
        user_id = tracing::field::Empty,
    ),
)]
pub async fn create_user(
    State(pool): State<Pool<Postgres>>,
    Json(body): Json<BodyData>,
) -> Result<impl IntoResponse, CreateUserError> {
    let new_user: NewUser = body.try_into().map_err(CreateUserError::ValidationError)?;

    let user = insert_user(&pool, &new_user)
        .await
        .context("Failed to insert a new user in the database")?;
    tracing::Span::current().record("user_id", &tracing::field::display(&user.id));

    Ok((StatusCode::CREATED, Json(user)))
}

#[tracing::instrument(name = "Listing users", skip(pool))]
pub async fn list_users(
    State(pool): State<Pool<Postgres>>,
) -> Result<Json<Vec<User>>, FetchUserError> {
    let users = get_users(&pool)
        .await
        .context("Failed to fetch users from the database")?;

    Ok(Json(users))
}

#[tracing::instrument(name = "Fetching a user", skip(pool))]
pub async fn get_user(
    State(pool): State<Pool<Postgres>>,
    Path(user_id): Path<i32>,
) -> Result<Json<User>, FetchUserError> {
    get_user_by_id(&pool, user_id)
        .await
        .context("Failed to fetch a user from the database")?
        .map(Json)
        .ok_or(FetchUserError::NotFound(user_id))
}

#[tracing::instrument(name = "Saving new user details in the database", skip(pool, new_user))]
async fn insert_user(pool: &Pool<Postgres>, new_user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (name, email, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, email
        "#,
    )
    .bind(new_user.name.as_ref())
    .bind(new_user.email.as_ref())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|error| {
        tracing::error!("Failed to execute query: {:?}", error);
        error
    })
}

#[tracing::instrument(name = "Get all users", skip(pool))]
async fn get_users(pool: &Pool<Postgres>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(|error| {
            tracing::error!("Failed to execute query: {:?}", error);
            error
        })
}

#[tracing::instrument(name = "Get user by id", skip(pool))]
async fn get_user_by_id(pool: &Pool<Postgres>, user_id: i32) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|error| {
            tracing::error!("Failed to execute query: {:?}", error);
            error
        })
}

#[derive(thiserror::Error)]
pub enum CreateUserError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to create a user")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for CreateUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl IntoResponse for CreateUserError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            CreateUserError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CreateUserError::UnexpectedError(_) => {
                tracing::error!("{:?}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(self.to_string())).into_response()
    }
}

#[derive(thiserror::Error)]
pub enum FetchUserError {
    #[error("User {0} does not exist")]
    NotFound(i32),
    #[error("Failed to fetch user data")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for FetchUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl IntoResponse for FetchUserError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            FetchUserError::NotFound(_) => StatusCode::NOT_FOUND,
            FetchUserError::UnexpectedError(_) => {
                tracing::error!("{:?}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(self.to_string())).into_response()
    }
}
