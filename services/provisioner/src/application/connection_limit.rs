//! 连接数上限启发式
//!
//! 读取集群的 `max_connections`，为服务角色保留 18 个连接给其他用途。
//! 读取阶段的任何问题都只记录警告并跳过；应用上限失败属于硬失败。

use pgprov_ports::QueryRow;
use tracing::{info, warn};

use super::statements::{SHOW_MAX_CONNECTIONS, connection_limit_sql};
use crate::domain::{ProvisioningContext, StepFuture, StepOutcome};

/// 为其他用途保留的连接数
pub const RESERVED_CONNECTIONS: i64 = 18;

/// 根据集群容量计算角色上限，容量不足时返回 `None`
pub fn compute_limit(capacity: i64) -> Option<i64> {
    if capacity > RESERVED_CONNECTIONS {
        Some(capacity - RESERVED_CONNECTIONS)
    } else {
        None
    }
}

/// 从 `SHOW max_connections` 的结果中解析容量
pub fn parse_capacity(rows: &[QueryRow]) -> Option<i64> {
    rows.first()?
        .get("max_connections")?
        .trim()
        .parse()
        .ok()
}

pub fn set_connection_limit(ctx: &ProvisioningContext) -> StepFuture<'_> {
    Box::pin(async move {
        if !ctx.flavor().caps_connections() {
            info!(flavor = ctx.flavor().as_str(), "Connection limit not applicable");
            return Ok(StepOutcome::Skipped);
        }

        let admin = ctx.pool().admin();
        let rows = match admin.query(SHOW_MAX_CONNECTIONS).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(sql = SHOW_MAX_CONNECTIONS, error = %e, "Failed to read connection capacity, skipping limit");
                return Ok(StepOutcome::Skipped);
            }
        };

        let Some(capacity) = parse_capacity(&rows) else {
            warn!(rows = rows.len(), "Connection capacity unavailable, skipping limit");
            return Ok(StepOutcome::Skipped);
        };

        let Some(limit) = compute_limit(capacity) else {
            warn!(
                capacity,
                reserved = RESERVED_CONNECTIONS,
                "Connection capacity too small, skipping limit"
            );
            return Ok(StepOutcome::Skipped);
        };

        let sql = connection_limit_sql(&ctx.names().role, limit);
        admin.query(&sql).await?;
        info!(capacity, limit, role = %ctx.names().role, "Connection limit applied");
        Ok(StepOutcome::Completed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: Option<&str>) -> Vec<QueryRow> {
        vec![QueryRow::new().with("max_connections", value.map(str::to_string))]
    }

    #[test]
    fn test_compute_limit() {
        assert_eq!(compute_limit(100), Some(82));
        assert_eq!(compute_limit(19), Some(1));
        assert_eq!(compute_limit(18), None);
        assert_eq!(compute_limit(10), None);
        assert_eq!(compute_limit(-5), None);
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity(&row(Some("100"))), Some(100));
        assert_eq!(parse_capacity(&row(Some(" 250 "))), Some(250));
        assert_eq!(parse_capacity(&row(Some("lots"))), None);
        assert_eq!(parse_capacity(&row(None)), None);
        assert_eq!(parse_capacity(&[]), None);
    }
}
