//! 基于连接池的 SQL 执行器

use async_trait::async_trait;
use pgprov_errors::{AppError, AppResult};
use pgprov_ports::{QueryExecutor, QueryRow};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row};
use tracing::{Instrument, debug, debug_span, warn};
use uuid::Uuid;

/// PostgreSQL SQL 执行器
///
/// 每次查询获取一个连接，生成新的 `req_id` 关联日志，
/// 无论成功失败都在返回前归还连接
pub struct PgQueryExecutor {
    pool: PgPool,
    database: String,
}

impl PgQueryExecutor {
    pub fn new(pool: PgPool, database: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn query(&self, sql: &str) -> AppResult<Vec<QueryRow>> {
        let req_id = Uuid::new_v4();
        let span = debug_span!("query", %req_id, database = %self.database);

        async move {
            let mut conn = self.pool.acquire().await.map_err(|e| {
                warn!(error = %e, "Failed to acquire connection");
                AppError::database(format!("Failed to acquire connection: {}", e))
            })?;

            debug!(sql, "Executing statement");
            // 不带参数时走简单查询协议：结果为文本格式，便于统一转换
            let result = sqlx::Executor::fetch_all(&mut *conn, sql).await;
            drop(conn);

            let rows = result.map_err(|e| {
                warn!(sql, error = %e, "Statement failed");
                AppError::database(format!("{}: {}", sql, e))
            })?;

            debug!(rows = rows.len(), "Statement completed");
            rows.iter().map(to_query_row).collect()
        }
        .instrument(span)
        .await
    }
}

fn to_query_row(row: &PgRow) -> AppResult<QueryRow> {
    let mut out = QueryRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value: Option<String> = row
            .try_get_unchecked(index)
            .map_err(|e| AppError::database(format!("Failed to decode column {}: {}", column.name(), e)))?;
        out.push(column.name(), value);
    }
    Ok(out)
}
