//! 内存版事务日志（InMemoryTransactionLog）
//!
//! 满足 `TransactionLog` 协议的参考实现，并附带写入端：
//! - `append` 为每条事务分配单调递增令牌并落入日志；
//! - 查询按追加顺序返回（时间戳升序、同戳保持日志顺序）；
//! - 典型用途：测试环境、示例与本地开发。
//!
use super::transaction_log::TransactionLog;
use crate::change::{ChangeToken, ChangedIdentifiers, LogTransaction};
use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// 简单的内存事务日志实现
pub struct InMemoryTransactionLog {
    store_id: String,
    transactions: Mutex<Vec<LogTransaction>>,
    next_sequence: AtomicU64,
}

impl InMemoryTransactionLog {
    pub fn new(store_id: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            transactions: Mutex::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// 写入端：提交一条事务，分配下一个令牌并返回完整记录。
    /// 调用方负责在追加之后发出日志变更信号。
    pub fn append(&self, author: Option<&str>, changed: ChangedIdentifiers) -> LogTransaction {
        self.append_at(author, changed, Utc::now())
    }

    /// 以指定时间戳提交（保留期测试需要构造过期事务）
    pub fn append_at(
        &self,
        author: Option<&str>,
        changed: ChangedIdentifiers,
        timestamp: DateTime<Utc>,
    ) -> LogTransaction {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction = LogTransaction::builder()
            .maybe_author(author.map(str::to_string))
            .timestamp(timestamp)
            .changed(changed)
            .token(ChangeToken::from_sequence(sequence))
            .build();
        self.transactions
            .lock()
            .expect("log lock")
            .push(transaction.clone());
        transaction
    }

    /// 当前日志长度
    pub fn len(&self) -> usize {
        self.transactions.lock().expect("log lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionLog for InMemoryTransactionLog {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn transactions_after(
        &self,
        after: Option<&ChangeToken>,
    ) -> StoreResult<Vec<LogTransaction>> {
        let transactions = self.transactions.lock().expect("log lock");
        Ok(transactions
            .iter()
            .filter(|tx| after.is_none_or(|t| tx.token() > t))
            .cloned()
            .collect())
    }

    async fn transactions_since(
        &self,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<LogTransaction>> {
        let transactions = self.transactions.lock().expect("log lock");
        Ok(transactions
            .iter()
            .filter(|tx| tx.timestamp() >= since)
            .cloned()
            .collect())
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let mut transactions = self.transactions.lock().expect("log lock");
        let before = transactions.len();
        transactions.retain(|tx| tx.timestamp() >= cutoff);
        Ok(before - transactions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ObjectId;
    use chrono::Duration;

    fn insert_of(key: &str) -> ChangedIdentifiers {
        ChangedIdentifiers::new(vec![ObjectId::new("Note", key)], vec![], vec![])
    }

    #[tokio::test]
    async fn transactions_after_is_strictly_greater() {
        let log = InMemoryTransactionLog::new("main");
        let t1 = log.append(Some("w"), insert_of("a"));
        let t2 = log.append(Some("w"), insert_of("b"));

        let all = log.transactions_after(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let after_t1 = log.transactions_after(Some(t1.token())).await.unwrap();
        assert_eq!(after_t1.len(), 1);
        assert_eq!(after_t1[0].token(), t2.token());

        let after_t2 = log.transactions_after(Some(t2.token())).await.unwrap();
        assert!(after_t2.is_empty());
    }

    #[tokio::test]
    async fn purge_keeps_transactions_at_or_after_cutoff() {
        let log = InMemoryTransactionLog::new("main");
        let now = Utc::now();
        log.append_at(Some("w"), insert_of("old"), now - Duration::days(2));
        log.append_at(Some("w"), insert_of("fresh"), now);

        let purged = log.purge_before(now - Duration::days(1)).await.unwrap();
        assert_eq!(purged, 1);

        let remaining = log.transactions_since(now - Duration::days(3)).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].changed().inserted()[0].key(), "fresh");
    }
}
