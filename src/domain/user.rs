use serde::{Deserialize, Serialize};

/// A stored user, as returned by every `/api/users` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}
