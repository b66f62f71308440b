/// 变更传播分发器（内存版）示例
/// 展示 写入端日志追加 -> 信号 -> 历史通知器合并 -> 合并事件发布 的闭环，
/// 以及同一令牌经两条通道到达时的去重
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use converge_domain::change::{ChangedIdentifiers, CoalescedEvent, ObjectId};
use converge_domain::context_inmemory::InMemoryContext;
use converge_domain::persist::{
    InMemoryTokenStore, InMemoryTransactionLog, StoreCapabilities, StoreDescriptor, TokenStore,
    TransactionLog,
};
use converge_domain::propagation::{
    ChangeObserver, ChangePropagationDispatcher, CommitSignalSource, LogChangedSignal,
    LogSignalSource, ObservedEntities, SignalHub,
};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// 示例观察者（ChangeObserver）
// ============================================================================

struct PrintObserver {
    name: &'static str,
    entities: ObservedEntities,
}

#[async_trait]
impl ChangeObserver for PrintObserver {
    fn observer_name(&self) -> &str {
        self.name
    }

    fn observed_entities(&self) -> ObservedEntities {
        self.entities.clone()
    }

    async fn handle(&self, event: &CoalescedEvent) -> AnyResult<()> {
        for (author, set) in event.iter() {
            println!(
                "observer={} author={} inserted={}",
                self.name,
                author,
                set.inserted().count()
            );
        }
        Ok(())
    }
}

fn insert_of(key: &str) -> ChangedIdentifiers {
    ChangedIdentifiers::new(vec![ObjectId::new("Note", key)], vec![], vec![])
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> AnyResult<()> {
    println!("=== 变更传播分发器（内存版）示例 ===\n");

    // 存储：内存日志 + 完整历史能力
    let log = Arc::new(InMemoryTransactionLog::new("main"));
    let capabilities = StoreCapabilities::builder()
        .supports_durable_log(true)
        .cross_process_signaling_enabled(true)
        .is_queryable_log_store(true)
        .build();
    let store = StoreDescriptor::builder()
        .store_id("main".to_string())
        .capabilities(capabilities)
        .log(log.clone() as Arc<dyn TransactionLog>)
        .build();

    // 信号枢纽与共享上下文
    let hub = SignalHub::new(64);
    let context = Arc::new(InMemoryContext::new("presentation"));
    let token_store = Arc::new(InMemoryTokenStore::new());

    // 分发器
    let dispatcher = Arc::new(
        ChangePropagationDispatcher::builder()
            .stores(vec![store])
            .context(context.clone())
            .token_store(token_store.clone() as Arc<dyn TokenStore>)
            .commit_source(Arc::new(hub.clone()) as Arc<dyn CommitSignalSource>)
            .log_source(Arc::new(hub.clone()) as Arc<dyn LogSignalSource>)
            .observers(vec![Arc::new(PrintObserver {
                name: "printer",
                entities: ObservedEntities::All,
            })])
            .build(),
    );

    let handle = dispatcher.clone().enable();
    println!("✅ 分发器已启用");
    tokio::time::sleep(Duration::from_millis(100)).await;

    // 写入端提交两条事务，各广播一次信号
    let t1 = log.append(Some("batchJob"), insert_of("n-1"));
    hub.publish_log_changed(LogChangedSignal::new("main", Some(t1.token().clone())));
    let t2 = log.append(Some("editor"), insert_of("n-2"));
    hub.publish_log_changed(LogChangedSignal::new("main", Some(t2.token().clone())));

    // 演示去重：t2 的信号重复到达，不会产生第二个事件
    hub.publish_log_changed(LogChangedSignal::new("main", Some(t2.token().clone())));

    tokio::time::sleep(Duration::from_millis(300)).await;
    println!(
        "持久化令牌: {:?}",
        token_store.load("main").map(|t| t.as_bytes().to_vec())
    );
    println!("共享上下文对象数: {}", context.live_ids().len());

    handle.disable();
    handle.join().await;
    println!("\n✅ 优雅关闭完成");
    Ok(())
}
