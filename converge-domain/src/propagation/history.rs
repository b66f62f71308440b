//! 历史路径变更通知器（HistoryChangeNotifier）
//!
//! 供具备持久化、可查询事务日志与跨进程信号的存储使用：
//! - 启动时装载每个存储的"最近已处理令牌"，并按保留期清理过期日志；
//! - 收到日志变更信号后，拉取令牌严格大于游标的事务批次，
//!   逐条按序合并进共享只读上下文，并按提交方聚合；
//! - 先写穿持久化最新令牌，落盘成功后才推进内存游标；
//! - 锁按存储划分：不同存储互不串行，同一存储的信号严格有序。
//!
use super::merger::ChangeSetMerger;
use super::signal::LogChangedSignal;
use super::window::SeenTokenWindow;
use crate::change::{ChangeToken, CoalescedEvent};
use crate::context::ExecutionContext;
use crate::persist::{TokenStore, TransactionLog};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// 默认日志保留期：7 天
pub const DEFAULT_RETENTION_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// 提交方缺失、空串与 "Unknown" 哨兵统一归入的桶
pub const UNKNOWN_AUTHOR: &str = "unknown";

fn normalize_author(author: Option<&str>) -> &str {
    match author {
        None => UNKNOWN_AUTHOR,
        Some(a) if a.is_empty() || a == "Unknown" => UNKNOWN_AUTHOR,
        Some(a) => a,
    }
}

/// 单个存储的历史游标；互斥锁保证同存储信号严格有序
struct StoreHistoryState {
    log: Arc<dyn TransactionLog>,
    cursor: Mutex<Option<ChangeToken>>,
}

pub struct HistoryChangeNotifier {
    context: Arc<dyn ExecutionContext>,
    token_store: Arc<dyn TokenStore>,
    window: Arc<SeenTokenWindow>,
    states: HashMap<String, StoreHistoryState>,
}

impl HistoryChangeNotifier {
    pub fn new(
        logs: impl IntoIterator<Item = (String, Arc<dyn TransactionLog>)>,
        context: Arc<dyn ExecutionContext>,
        token_store: Arc<dyn TokenStore>,
        window: Arc<SeenTokenWindow>,
    ) -> Self {
        let states = logs
            .into_iter()
            .map(|(store_id, log)| {
                (
                    store_id,
                    StoreHistoryState {
                        log,
                        cursor: Mutex::new(None),
                    },
                )
            })
            .collect();
        Self {
            context,
            token_store,
            window,
            states,
        }
    }

    /// 启动装载：恢复各存储游标，并清理保留期之外的日志。
    /// 清理失败仅告警，下次装载重试。
    pub async fn bootstrap(&self, retention: Duration) {
        let cutoff = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|d| Utc::now().checked_sub_signed(d));

        for (store_id, state) in &self.states {
            {
                let mut cursor = state.cursor.lock().await;
                *cursor = self.token_store.load(store_id);
            }
            let Some(cutoff) = cutoff else { continue };
            match state.log.purge_before(cutoff).await {
                Ok(purged) if purged > 0 => {
                    debug!(store_id = %store_id, purged, "expired history purged");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(store_id = %store_id, error = %e, "history purge failed, retrying on next reload");
                }
            }
        }
    }

    /// 处理一条日志变更信号；返回待发布的合并事件。
    /// 日志读取失败只记录错误并跳过本轮，游标不动，下个信号从原位点重试。
    pub async fn handle_signal(&self, signal: &LogChangedSignal) -> Option<CoalescedEvent> {
        let Some(state) = self.states.get(signal.store_id()) else {
            debug!(store_id = signal.store_id(), "signal for unrouted store, ignoring");
            return None;
        };

        let mut cursor = state.cursor.lock().await;

        if let Some(token) = signal.token()
            && !self.window.should_process(token)
        {
            debug!(
                store_id = signal.store_id(),
                "log change already propagated via another channel, skipping"
            );
            return None;
        }

        let mut batch = match state.log.transactions_after(cursor.as_ref()).await {
            Ok(batch) => batch,
            Err(e) => {
                error!(store_id = signal.store_id(), error = %e, "transaction log read failed, skipping cycle");
                return None;
            }
        };
        // 时间戳升序；稳定排序保持同戳记录的日志内在顺序
        batch.sort_by_key(|tx| tx.timestamp());

        let mut mergers: HashMap<String, ChangeSetMerger> = HashMap::new();
        for tx in &batch {
            self.context.merge_changes(tx.changed());
            mergers
                .entry(normalize_author(tx.author()).to_string())
                .or_default()
                .merge(tx.changed().clone());
        }

        // 取批次末尾令牌与信号令牌中较新者；只有严格超过游标才落盘推进
        let mut newest = batch.iter().map(|tx| tx.token().clone()).max();
        if let Some(token) = signal.token()
            && newest.as_ref().is_none_or(|n| token > n)
        {
            newest = Some(token.clone());
        }
        if let Some(token) = newest
            && cursor.as_ref().is_none_or(|c| token > *c)
        {
            match self.token_store.save(signal.store_id(), &token) {
                Ok(()) => *cursor = Some(token),
                Err(e) => {
                    // 游标不推进：下个信号重放同一批次（合并幂等，安全）
                    error!(store_id = signal.store_id(), error = %e, "token persistence failed, cursor unchanged");
                }
            }
        }
        drop(cursor);

        if batch.is_empty() {
            return None;
        }
        Some(CoalescedEvent::new(
            mergers.into_iter().map(|(a, m)| (a, m.build())).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ChangedIdentifiers, ObjectId};
    use crate::context_inmemory::InMemoryContext;
    use crate::persist::{InMemoryTokenStore, InMemoryTransactionLog};

    fn insert_of(key: &str) -> ChangedIdentifiers {
        ChangedIdentifiers::new(vec![ObjectId::new("Note", key)], vec![], vec![])
    }

    struct Fixture {
        notifier: HistoryChangeNotifier,
        log: Arc<InMemoryTransactionLog>,
        context: Arc<InMemoryContext>,
        token_store: Arc<InMemoryTokenStore>,
    }

    fn fixture() -> Fixture {
        let log = Arc::new(InMemoryTransactionLog::new("main"));
        let context = Arc::new(InMemoryContext::new("viewer"));
        let token_store = Arc::new(InMemoryTokenStore::new());
        let notifier = HistoryChangeNotifier::new(
            [(
                "main".to_string(),
                log.clone() as Arc<dyn TransactionLog>,
            )],
            context.clone(),
            token_store.clone(),
            Arc::new(SeenTokenWindow::default()),
        );
        Fixture {
            notifier,
            log,
            context,
            token_store,
        }
    }

    #[test]
    fn author_normalization_collapses_sentinels() {
        assert_eq!(normalize_author(None), UNKNOWN_AUTHOR);
        assert_eq!(normalize_author(Some("")), UNKNOWN_AUTHOR);
        assert_eq!(normalize_author(Some("Unknown")), UNKNOWN_AUTHOR);
        assert_eq!(normalize_author(Some("batchJob")), "batchJob");
    }

    #[tokio::test]
    async fn batch_merges_in_order_and_persists_token() {
        let f = fixture();
        f.log.append(Some("batchJob"), insert_of("a"));
        let t2 = f.log.append(Some("batchJob"), insert_of("b"));

        let event = f
            .notifier
            .handle_signal(&LogChangedSignal::new("main", Some(t2.token().clone())))
            .await
            .unwrap();

        let set = event.changes_by("batchJob").unwrap();
        assert_eq!(set.inserted().count(), 2);
        assert_eq!(f.token_store.load("main"), Some(t2.token().clone()));
        assert!(f.context.live_ids().contains(&ObjectId::new("Note", "a")));
        assert!(f.context.live_ids().contains(&ObjectId::new("Note", "b")));
    }

    #[tokio::test]
    async fn second_delivery_of_same_token_is_skipped() {
        let f = fixture();
        let t1 = f.log.append(Some("w"), insert_of("a"));
        let signal = LogChangedSignal::new("main", Some(t1.token().clone()));

        assert!(f.notifier.handle_signal(&signal).await.is_some());
        assert!(f.notifier.handle_signal(&signal).await.is_none());
    }

    #[tokio::test]
    async fn missing_authors_group_into_unknown_bucket() {
        let f = fixture();
        f.log.append(None, insert_of("a"));
        f.log.append(Some(""), insert_of("b"));
        f.log.append(Some("Unknown"), insert_of("c"));

        let event = f
            .notifier
            .handle_signal(&LogChangedSignal::new("main", None))
            .await
            .unwrap();

        assert_eq!(event.authors().count(), 1);
        assert_eq!(
            event.changes_by(UNKNOWN_AUTHOR).unwrap().inserted().count(),
            3
        );
    }

    #[tokio::test]
    async fn unrouted_store_is_ignored() {
        let f = fixture();
        f.log.append(Some("w"), insert_of("a"));
        assert!(
            f.notifier
                .handle_signal(&LogChangedSignal::new("other", None))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn bootstrap_resumes_from_persisted_token() {
        let f = fixture();
        let t1 = f.log.append(Some("w"), insert_of("a"));
        f.token_store.save("main", t1.token()).unwrap();

        f.notifier.bootstrap(DEFAULT_RETENTION_WINDOW).await;
        // t1 之前的事务不再重放；没有新事务时本轮无事件
        assert!(
            f.notifier
                .handle_signal(&LogChangedSignal::new("main", None))
                .await
                .is_none()
        );

        let t2 = f.log.append(Some("w"), insert_of("b"));
        let event = f
            .notifier
            .handle_signal(&LogChangedSignal::new("main", Some(t2.token().clone())))
            .await
            .unwrap();
        let set = event.changes_by("w").unwrap();
        assert_eq!(set.inserted().count(), 1);
    }

    #[tokio::test]
    async fn bootstrap_purges_expired_history() {
        let f = fixture();
        let now = Utc::now();
        f.log
            .append_at(Some("w"), insert_of("old"), now - chrono::Duration::days(2));
        f.log.append_at(Some("w"), insert_of("fresh"), now);

        f.notifier
            .bootstrap(Duration::from_secs(24 * 60 * 60))
            .await;

        let remaining = f
            .log
            .transactions_since(now - chrono::Duration::days(3))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].changed().inserted()[0].key(), "fresh");
    }
}
