//! 端到端演示：双路径变更传播
//!
//! - `notes` 存储具备持久化日志能力，走历史路径（令牌侧车落盘）；
//! - `drafts` 存储无日志能力，走兼容路径（同进程提交信号）；
//! - 观察者与事件流订阅者都从唯一的发布任务拿到合并事件。
//!
use async_trait::async_trait;
use converge_application::{ObserverRegistry, StoreContainer};
use converge_domain::change::{ChangedIdentifiers, CoalescedEvent, ObjectId};
use converge_domain::context_inmemory::InMemoryContext;
use converge_domain::persist::{
    FileTokenStore, InMemoryTransactionLog, StoreCapabilities, StoreDescriptor, TokenStore,
    TransactionLog, sidecar_path,
};
use converge_domain::propagation::{
    ChangeObserver, CommitChanges, CommitSignal, LogChangedSignal, ObservedEntities, SignalHub,
};
use std::sync::Arc;
use std::time::Duration;
use ulid::Ulid;

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

    async fn handle(&self, event: &CoalescedEvent) -> anyhow::Result<()> {
        for (author, set) in event.iter() {
            println!(
                "observer={} author={} inserted={} updated={} deleted={}",
                self.name,
                author,
                set.inserted().count(),
                set.updated().count(),
                set.deleted().count(),
            );
        }
        Ok(())
    }
}

fn insert_of(entity: &str, key: &str) -> ChangedIdentifiers {
    ChangedIdentifiers::new(vec![ObjectId::new(entity, key)], vec![], vec![])
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("=== 变更传播（双路径）示例 ===\n");

    // 历史路径存储：具备持久化日志 + 跨进程信号 + 可查询
    let notes_path = std::env::temp_dir().join(format!("converge-demo-{}.notes", Ulid::new()));
    let notes_log = Arc::new(InMemoryTransactionLog::new("notes"));
    let notes_caps = StoreCapabilities::builder()
        .supports_durable_log(true)
        .cross_process_signaling_enabled(true)
        .is_queryable_log_store(true)
        .build();

    let stores = vec![
        StoreDescriptor::builder()
            .store_id("notes".to_string())
            .path(notes_path.clone())
            .capabilities(notes_caps)
            .log(notes_log.clone() as Arc<dyn TransactionLog>)
            .build(),
        // 兼容路径存储：无日志能力
        StoreDescriptor::builder().store_id("drafts".to_string()).build(),
    ];

    let hub = SignalHub::new(64);
    let context = Arc::new(InMemoryContext::new("presentation"));
    let token_store = Arc::new(FileTokenStore::for_descriptors(&stores));

    let registry = ObserverRegistry::new();
    registry.register(Arc::new(PrintObserver {
        name: "all-entities",
        entities: ObservedEntities::All,
    }))?;
    registry.register(Arc::new(PrintObserver {
        name: "notes-only",
        entities: ObservedEntities::One("Note".to_string()),
    }))?;

    let container = StoreContainer::assemble(
        stores,
        context.clone(),
        token_store.clone(),
        Arc::new(hub.clone()),
        Arc::new(hub.clone()),
        &registry,
    );
    container.enable()?;
    println!("✅ 传播已启用");
    tokio::time::sleep(Duration::from_millis(100)).await;

    // 历史路径：写入端追加事务并广播日志变更信号
    let tx = notes_log.append(Some("batchJob"), insert_of("Note", "n-1"));
    hub.publish_log_changed(LogChangedSignal::new("notes", Some(tx.token().clone())));
    // 同一信号重复投递：被已见令牌窗口去重，不会产生第二个事件
    hub.publish_log_changed(LogChangedSignal::new("notes", Some(tx.token().clone())));

    // 兼容路径：同进程提交信号直接携带变更集
    hub.publish_commit(
        CommitSignal::builder()
            .store_id("drafts".to_string())
            .context_name("editor".to_string())
            .changes(CommitChanges::Identifiers(insert_of("Draft", "d-1")))
            .build(),
    );

    tokio::time::sleep(Duration::from_millis(300)).await;

    // 管理面：历史概况与保留期
    let summary = container.history_summary("notes").await?;
    println!("\n历史概况: {}", serde_json::to_string_pretty(&summary)?);
    println!("保留期: {:?}", container.retention_window());

    container.disable().await?;
    println!("✅ 传播已停用");

    // 令牌侧车已落盘：重启后从该位点继续，不会重放已合并的事务
    let resumed = token_store.load("notes");
    println!(
        "侧车令牌已持久化: {}",
        resumed
            .map(|t| format!("{:?}", t.as_bytes()))
            .unwrap_or_default()
    );
    println!("共享上下文对象数: {}", context.live_ids().len());

    let _ = std::fs::remove_file(sidecar_path(&notes_path));
    println!("\n✅ 演示结束");
    Ok(())
}
