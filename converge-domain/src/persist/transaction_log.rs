//! 事务日志（TransactionLog）协议
//!
//! 定义存储层持久化事务日志的只读查询与保留期清理接口。
//! 日志保证同一存储内事务全序；本子系统只按令牌区间与时间区间读取，
//! 不感知具体存储后端。
//!
use crate::change::{ChangeToken, LogTransaction};
use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 事务日志：按令牌/时间区间查询，并支持保留期清理
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// 日志所属存储的标识
    fn store_id(&self) -> &str;

    /// 返回令牌严格大于 `after` 的全部事务；`None` 表示从日志起点读取。
    /// 结果按时间戳升序，时间戳相同时保持日志内在顺序。
    async fn transactions_after(
        &self,
        after: Option<&ChangeToken>,
    ) -> StoreResult<Vec<LogTransaction>>;

    /// 返回时间戳不早于 `since` 的全部事务
    async fn transactions_since(
        &self,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<LogTransaction>>;

    /// 删除时间戳早于 `cutoff` 的事务，返回删除条数
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> StoreResult<usize>;
}

#[async_trait]
impl<T> TransactionLog for Arc<T>
where
    T: TransactionLog + ?Sized,
{
    fn store_id(&self) -> &str {
        (**self).store_id()
    }

    async fn transactions_after(
        &self,
        after: Option<&ChangeToken>,
    ) -> StoreResult<Vec<LogTransaction>> {
        (**self).transactions_after(after).await
    }

    async fn transactions_since(
        &self,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<LogTransaction>> {
        (**self).transactions_since(since).await
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        (**self).purge_before(cutoff).await
    }
}
