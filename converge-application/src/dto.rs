//! 容器管理操作的只读视图（DTO）
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 单个存储的历史概况，供运维侧查看
#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub store_id: String,
    pub transaction_count: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}
