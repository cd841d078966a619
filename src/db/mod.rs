pub mod models;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::users::{UserRepository, UserState};

/// Postgres-backed user state, one JSONB document per user.
#[derive(Debug, Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS user_states (
                id BIGINT PRIMARY KEY,
                state JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn load(&self, user_id: i64) -> anyhow::Result<UserState> {
        let row = sqlx::query_as::<_, models::UserStateRow>(
            "SELECT id, state, updated_at FROM user_states WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(row.state.0);
        }

        let fresh = UserState::new(user_id);
        sqlx::query(
            "INSERT INTO user_states (id, state) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(user_id)
        .bind(Json(&fresh))
        .execute(&self.pool)
        .await?;

        Ok(fresh)
    }

    async fn save(&self, state: &UserState) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_states (id, state, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET state = EXCLUDED.state, updated_at = NOW()
            "#,
        )
        .bind(state.user_id)
        .bind(Json(state))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
