//! # PostgreSQL
//!
//! Primary store when `DATABASE_URL` is set.
//!
//! ## Schema
//! - One row per submission in `survey_responses`
//! - `id` is a `BIGSERIAL`, so identifiers stay unique under concurrent inserts
//! - Answers are kept as `JSONB` in their normalized form, statistics are computed in the server
//!
//! ## Connection handling
//! - The pool is created lazily, startup does not fail if the database is down
//! - The schema is created on first successful use and remembered afterwards
//! - `ping` backs the readiness check
use std::time::Duration;

use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use questions::{StoredResponse, SurveySubmission};
use serde_json::Value;
use tokio::sync::OnceCell;
use tokio_postgres::{NoTls, Row};
use tracing::info;

use crate::store::{NewResponse, StoreError};

const POOL_SIZE: usize = 5;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS survey_responses (
        id BIGSERIAL PRIMARY KEY,
        created_at TIMESTAMPTZ NOT NULL,
        client_timestamp TEXT,
        client_ip TEXT,
        user_agent TEXT,
        answers JSONB NOT NULL
    );
    CREATE INDEX IF NOT EXISTS survey_responses_created_at_idx
        ON survey_responses (created_at DESC);
";

pub struct PostgresStore {
    pool: Pool,
    schema: OnceCell<()>,
}

impl PostgresStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());
        cfg.connect_timeout = Some(CONNECT_TIMEOUT);
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(POOL_SIZE);
        pool_config.timeouts.wait = Some(WAIT_TIMEOUT);
        pool_config.timeouts.create = Some(CONNECT_TIMEOUT);
        cfg.pool = Some(pool_config);

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        Ok(Self {
            pool,
            schema: OnceCell::new(),
        })
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.schema
            .get_or_try_init(|| async {
                let client = self.pool.get().await?;
                client.batch_execute(SCHEMA).await?;

                info!("Database schema ready");
                Ok::<(), StoreError>(())
            })
            .await?;

        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.simple_query("SELECT 1").await?;

        Ok(())
    }

    pub async fn insert(&self, response: &NewResponse) -> Result<StoredResponse, StoreError> {
        self.ensure_schema().await?;

        let client = self.pool.get().await?;
        let answers = serde_json::to_value(&response.answers)?;

        let row = client
            .query_one(
                r#"
                INSERT INTO survey_responses
                    (created_at, client_timestamp, client_ip, user_agent, answers)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
                &[
                    &response.created_at,
                    &response.answers.timestamp,
                    &response.client_ip,
                    &response.user_agent,
                    &answers,
                ],
            )
            .await?;

        let id: i64 = row.try_get(0)?;

        Ok(response.clone().with_id(id.to_string()))
    }

    /// All rows, newest first.
    pub async fn list(&self) -> Result<Vec<StoredResponse>, StoreError> {
        self.ensure_schema().await?;

        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT id, created_at, client_ip, user_agent, answers
                FROM survey_responses
                ORDER BY created_at DESC, id DESC
                "#,
                &[],
            )
            .await?;

        rows.iter().map(from_row).collect()
    }
}

fn from_row(row: &Row) -> Result<StoredResponse, StoreError> {
    let id: i64 = row.try_get(0)?;
    let created_at: DateTime<Utc> = row.try_get(1)?;
    let answers: Value = row.try_get(4)?;

    Ok(StoredResponse {
        id: id.to_string(),
        created_at,
        client_ip: row.try_get(2)?,
        user_agent: row.try_get(3)?,
        answers: serde_json::from_value::<SurveySubmission>(answers)?,
    })
}
