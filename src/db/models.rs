use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::users::UserState;

#[derive(Debug, Clone, FromRow)]
pub struct UserStateRow {
    pub id: i64,
    pub state: Json<UserState>,
    pub updated_at: DateTime<Utc>,
}
