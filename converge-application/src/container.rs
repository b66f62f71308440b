//! 存储容器（StoreContainer）
//!
//! 容器级装配与管理面：
//! - 装配时完成能力探测与传播路径绑定（经由分发器构造）；
//! - 托管 `enable`/`disable` 生命周期；
//! - 暴露历史管理操作：按时间装载、按时间清理、保留期读写与概况。
//!
use crate::dto::HistorySummary;
use crate::error::AppError;
use crate::registry::ObserverRegistry;
use chrono::{DateTime, Utc};
use converge_domain::change::{CoalescedEvent, LogTransaction};
use converge_domain::context::ExecutionContext;
use converge_domain::persist::{StoreDescriptor, TokenStore, TransactionLog};
use converge_domain::propagation::{
    ChangePropagationDispatcher, CommitSignalSource, DispatcherHandle, LogSignalSource,
};
use futures_core::stream::BoxStream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct StoreContainer {
    logs: HashMap<String, Arc<dyn TransactionLog>>,
    dispatcher: Arc<ChangePropagationDispatcher>,
    handle: Mutex<Option<DispatcherHandle>>,
}

impl StoreContainer {
    /// 装配容器。观察者注册须在此之前完成，此处取注册表快照。
    pub fn assemble(
        stores: Vec<StoreDescriptor>,
        context: Arc<dyn ExecutionContext>,
        token_store: Arc<dyn TokenStore>,
        commit_source: Arc<dyn CommitSignalSource>,
        log_source: Arc<dyn LogSignalSource>,
        registry: &ObserverRegistry,
    ) -> Self {
        let logs = stores
            .iter()
            .filter_map(|d| d.log().map(|log| (d.store_id().to_string(), log.clone())))
            .collect();
        let dispatcher = Arc::new(
            ChangePropagationDispatcher::builder()
                .stores(stores)
                .context(context)
                .token_store(token_store)
                .commit_source(commit_source)
                .log_source(log_source)
                .observers(registry.snapshot())
                .build(),
        );
        Self {
            logs,
            dispatcher,
            handle: Mutex::new(None),
        }
    }

    /// 启用传播；重复启用报错
    pub fn enable(&self) -> Result<(), AppError> {
        let mut handle = self.handle.lock().expect("handle lock");
        if handle.is_some() {
            return Err(AppError::AlreadyEnabled);
        }
        *handle = Some(self.dispatcher.clone().enable());
        Ok(())
    }

    /// 停用传播并等待任务退出；未启用时报错
    pub async fn disable(&self) -> Result<(), AppError> {
        let handle = {
            let mut guard = self.handle.lock().expect("handle lock");
            guard.take()
        };
        let Some(handle) = handle else {
            return Err(AppError::NotEnabled);
        };
        handle.disable();
        handle.join().await;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.lock().expect("handle lock").is_some()
    }

    /// 订阅容器级合并事件流
    pub fn subscribe(&self) -> BoxStream<'static, CoalescedEvent> {
        self.dispatcher.subscribe()
    }

    // ---- 历史管理操作 ----

    /// 装载给定时间之后的历史事务
    pub async fn load_history(
        &self,
        store_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LogTransaction>, AppError> {
        let log = self.log_for(store_id)?;
        Ok(log.transactions_since(since).await?)
    }

    /// 清理给定时间之前的历史事务，返回删除条数
    pub async fn purge_history(
        &self,
        store_id: &str,
        before: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        let log = self.log_for(store_id)?;
        Ok(log.purge_before(before).await?)
    }

    /// 单个存储的历史概况
    pub async fn history_summary(&self, store_id: &str) -> Result<HistorySummary, AppError> {
        let log = self.log_for(store_id)?;
        let transactions = log.transactions_since(DateTime::<Utc>::MIN_UTC).await?;
        Ok(HistorySummary {
            store_id: store_id.to_string(),
            transaction_count: transactions.len(),
            earliest: transactions.iter().map(LogTransaction::timestamp).min(),
            latest: transactions.iter().map(LogTransaction::timestamp).max(),
        })
    }

    /// 当前配置的日志保留期
    pub fn retention_window(&self) -> Duration {
        self.dispatcher.retention_window()
    }

    pub fn set_retention_window(&self, window: Duration) {
        self.dispatcher.set_retention_window(window);
    }

    fn log_for(&self, store_id: &str) -> Result<&Arc<dyn TransactionLog>, AppError> {
        self.logs
            .get(store_id)
            .ok_or_else(|| AppError::StoreNotFound(store_id.to_string()))
    }
}
