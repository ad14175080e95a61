//! SQL 执行 trait 定义

use async_trait::async_trait;
use pgprov_errors::AppResult;

/// 结果行，列值统一为文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRow {
    columns: Vec<(String, Option<String>)>,
}

impl QueryRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.columns.push((name.into(), value));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.columns.push((name.into(), value));
    }

    /// 按列名取值，NULL 与不存在的列都返回 None
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// SQL 执行 trait
///
/// 每次调用独立获取连接，执行一条语句后归还
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn query(&self, sql: &str) -> AppResult<Vec<QueryRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get() {
        let row = QueryRow::new()
            .with("max_connections", Some("100".to_string()))
            .with("comment", None);
        assert_eq!(row.get("max_connections"), Some("100"));
        assert_eq!(row.get("comment"), None);
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }
}
