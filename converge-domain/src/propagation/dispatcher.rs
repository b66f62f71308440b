//! 变更传播分发器（ChangePropagationDispatcher）
//!
//! 统一编排"信号订阅 → 通知器合并 → 合并事件发布"的长驻任务：
//! - 装配时按能力探测为每个存储二选一地绑定兼容/历史传播路径，
//!   之后不再重新评估；
//! - 订阅两条信号通道，把信号路由给对应通知器；
//! - 所有合并事件经由唯一的发布任务顺序投递给观察者与流订阅者，
//!   观察方得到单线程视角；
//! - 提供关闭与等待的 `DispatcherHandle`；停用后不再发布任何事件。
//!
use super::history::{DEFAULT_RETENTION_WINDOW, HistoryChangeNotifier};
use super::legacy::LegacyChangeNotifier;
use super::observer::ChangeObserver;
use super::signal::{CommitSignalSource, LogSignalSource};
use super::window::SeenTokenWindow;
use crate::change::CoalescedEvent;
use crate::context::ExecutionContext;
use crate::persist::{StoreDescriptor, TokenStore, TransactionLog};
use bon::Builder;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

// 导入由 bon::Builder 生成的 typestate 模块与状态转换别名
use self::change_propagation_dispatcher_builder::{IsUnset, SetRegistry, State as BuilderState};

/// 流订阅者的广播缓冲区容量
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 每个存储绑定的传播路径；装配时一次性确定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropagationRoute {
    Legacy,
    History,
}

/// ChangePropagationDispatcher：
/// - 按能力探测为每个存储选择传播路径
/// - 订阅提交/日志两条信号通道并路由到通知器
/// - 经唯一发布任务投递合并事件
#[derive(Builder)]
pub struct ChangePropagationDispatcher {
    stores: Vec<StoreDescriptor>,
    context: Arc<dyn ExecutionContext>,
    token_store: Arc<dyn TokenStore>,
    commit_source: Arc<dyn CommitSignalSource>,
    log_source: Arc<dyn LogSignalSource>,
    #[builder(setters(vis = "pub(crate)"))]
    registry: ObserverSet,
    /// 跨通道去重窗口；按分发器实例共享，停用/重启之间保持
    #[builder(default = Arc::new(SeenTokenWindow::default()))]
    window: Arc<SeenTokenWindow>,
    /// 日志保留期；可在运行期读写
    #[builder(default = Arc::new(RwLock::new(DEFAULT_RETENTION_WINDOW)))]
    retention: Arc<RwLock<Duration>>,
    #[builder(default)]
    config: DispatcherConfig,
    #[builder(default = broadcast::channel(EVENT_CHANNEL_CAPACITY).0)]
    events_tx: broadcast::Sender<CoalescedEvent>,
}

impl<S: BuilderState> ChangePropagationDispatcherBuilder<S> {
    pub fn observers(
        self,
        observers: Vec<Arc<dyn ChangeObserver>>,
    ) -> ChangePropagationDispatcherBuilder<SetRegistry<S>>
    where
        <S as BuilderState>::Registry: IsUnset,
    {
        self.registry(ObserverSet::new(observers))
    }
}

impl ChangePropagationDispatcher {
    /// 当前配置的日志保留期
    pub fn retention_window(&self) -> Duration {
        *self.retention.read().expect("retention lock")
    }

    pub fn set_retention_window(&self, window: Duration) {
        *self.retention.write().expect("retention lock") = window;
    }

    /// 订阅合并事件流；滞后丢失的事件被静默跳过
    pub fn subscribe(&self) -> BoxStream<'static, CoalescedEvent> {
        let rx = self.events_tx.subscribe();
        Box::pin(BroadcastStream::new(rx).filter_map(|r| async move { r.ok() }))
    }

    /// 启用传播，返回可用于停用/等待的句柄
    pub fn enable(self: Arc<Self>) -> DispatcherHandle {
        let cancel = CancellationToken::new();
        let routes = Arc::new(self.resolve_routes());
        let retention = self.retention_window();

        let legacy = Arc::new(LegacyChangeNotifier::new(
            self.context.clone(),
            self.window.clone(),
        ));
        let history_logs: Vec<(String, Arc<dyn TransactionLog>)> = self
            .stores
            .iter()
            .filter(|d| routes.get(d.store_id()) == Some(&PropagationRoute::History))
            .filter_map(|d| d.log().map(|log| (d.store_id().to_string(), log.clone())))
            .collect();
        let history = Arc::new(HistoryChangeNotifier::new(
            history_logs,
            self.context.clone(),
            self.token_store.clone(),
            self.window.clone(),
        ));

        let (publish_tx, publish_rx) = mpsc::channel(self.config.publish_buffer);
        let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(3);

        // 提交信号循环（兼容路径）
        {
            let source = self.commit_source.clone();
            let routes = routes.clone();
            let publish_tx = publish_tx.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                let mut stream = source.subscribe().await;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        maybe = stream.next() => match maybe {
                            Some(Ok(signal)) => {
                                if routes.get(signal.store_id())
                                    != Some(&PropagationRoute::Legacy)
                                {
                                    continue;
                                }
                                if let Some(event) = legacy.handle_commit(&signal) {
                                    let _ = publish_tx.send(event).await;
                                }
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "commit signal channel error");
                            }
                            None => break,
                        }
                    }
                }
            }));
        }

        // 日志信号循环（历史路径）：不同存储的信号并发处理，
        // 同存储内顺序由每存储锁与令牌区间拉取共同保证
        {
            let source = self.log_source.clone();
            let routes = routes.clone();
            let publish_tx = publish_tx.clone();
            let cancel = cancel.clone();
            let concurrency = self.config.signal_concurrency;
            tasks.push(tokio::spawn(async move {
                let stream = source.subscribe().await;
                history.bootstrap(retention).await;
                stream
                    .take_until(cancel.cancelled_owned())
                    .for_each_concurrent(Some(concurrency), move |maybe| {
                        let routes = routes.clone();
                        let history = history.clone();
                        let publish_tx = publish_tx.clone();
                        async move {
                            match maybe {
                                Ok(signal) => {
                                    if routes.get(signal.store_id())
                                        != Some(&PropagationRoute::History)
                                    {
                                        return;
                                    }
                                    if let Some(event) = history.handle_signal(&signal).await {
                                        let _ = publish_tx.send(event).await;
                                    }
                                }
                                Err(e) => {
                                    warn!(error = %e, "log signal channel error");
                                }
                            }
                        }
                    })
                    .await;
            }));
        }

        // 发布循环（表现任务）：合并事件在此顺序投递，停用后即停发
        {
            let registry = self.registry.clone();
            let events_tx = self.events_tx.clone();
            let cancel = cancel.clone();
            let mut publish_rx = publish_rx;
            tasks.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        maybe = publish_rx.recv() => match maybe {
                            Some(event) => {
                                if event.is_empty() {
                                    continue;
                                }
                                for observer in registry.matching(&event) {
                                    if let Err(e) = observer.handle(&event).await {
                                        error!(
                                            observer = observer.observer_name(),
                                            error = %e,
                                            "change observer failed"
                                        );
                                    }
                                }
                                // 无流订阅者时发送失败，视为非致命并忽略
                                let _ = events_tx.send(event);
                            }
                            None => break,
                        }
                    }
                }
            }));
        }

        DispatcherHandle { token: cancel, tasks }
    }

    /// 能力探测 -> 传播路径；仅在启用装配时解析一次
    fn resolve_routes(&self) -> HashMap<String, PropagationRoute> {
        self.stores
            .iter()
            .map(|d| {
                let route = if d.capabilities().supports_history() {
                    if d.log().is_some() {
                        PropagationRoute::History
                    } else {
                        warn!(
                            store_id = d.store_id(),
                            "store claims history support but has no log handle, falling back"
                        );
                        PropagationRoute::Legacy
                    }
                } else {
                    PropagationRoute::Legacy
                };
                (d.store_id().to_string(), route)
            })
            .collect()
    }
}

/// 分发器配置
#[derive(Clone, Copy, Debug)]
pub struct DispatcherConfig {
    /// 历史路径信号的并发处理上限（跨存储）
    pub signal_concurrency: usize,
    /// 待发布合并事件的缓冲长度
    pub publish_buffer: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            signal_concurrency: 8,
            publish_buffer: 64,
        }
    }
}

/// 分发器运行句柄：用于停用与等待任务结束
pub struct DispatcherHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// 停用：停止订阅与发布；不取消进行中的合并
    pub fn disable(&self) {
        self.token.cancel();
    }

    pub async fn join(mut self) {
        let tasks = std::mem::take(&mut self.tasks);

        for t in tasks {
            let _ = t.await;
        }
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        self.disable();
    }
}

#[derive(Clone, Default)]
struct ObserverSet {
    observers: Vec<Arc<dyn ChangeObserver>>,
}

impl ObserverSet {
    fn new(observers: Vec<Arc<dyn ChangeObserver>>) -> Self {
        Self { observers }
    }

    /// 与事件相关的观察者；按关注实体短路判定
    fn matching(&self, event: &CoalescedEvent) -> Vec<Arc<dyn ChangeObserver>> {
        self.observers
            .iter()
            .filter(|o| o.observed_entities().matches(event))
            .cloned()
            .collect()
    }
}
