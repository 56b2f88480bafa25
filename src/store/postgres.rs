//! PostgreSQL-backed [`UserStore`].

use super::{StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the schema statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "CREATE",
            db.statement = SCHEMA_SQL
        );
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }
}

fn record_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password: row.try_get("password")?,
        otp: row.try_get("otp")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = "SELECT email, name, password, otp FROM users WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.as_ref().map(record_from_row).transpose()?)
    }

    async fn upsert(&self, record: &UserRecord) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO users (email, name, password, otp)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                password = EXCLUDED.password,
                otp = EXCLUDED.otp,
                updated_at = NOW()
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&record.email)
            .bind(&record.name)
            .bind(&record.password)
            .bind(&record.otp)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }

    async fn set_otp(&self, email: &str, otp: &str) -> Result<(), StoreError> {
        let query = "UPDATE users SET otp = $2, updated_at = NOW() WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(email)
            .bind(otp)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(email.to_string()));
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let query = "SELECT email, name, password, otp FROM users ORDER BY email";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        Ok(rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}
