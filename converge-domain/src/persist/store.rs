//! 存储能力探测（StoreCapabilities）与存储描述（StoreDescriptor）
//!
//! 分发器在装配时对每个存储探测一次能力，据此在历史/兼容两条
//! 传播路径中二选一；运行期不再重新评估。
//!
use super::transaction_log::TransactionLog;
use bon::Builder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 存储层能力探测结果
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct StoreCapabilities {
    /// 是否提供持久化事务日志
    #[builder(default)]
    supports_durable_log: bool,
    /// 是否开启跨进程日志变更通知
    #[builder(default)]
    cross_process_signaling_enabled: bool,
    /// 日志是否可按令牌/时间区间查询
    #[builder(default)]
    is_queryable_log_store: bool,
}

impl StoreCapabilities {
    /// 同时具备三项能力才走历史传播路径
    pub fn supports_history(&self) -> bool {
        self.supports_durable_log
            && self.cross_process_signaling_enabled
            && self.is_queryable_log_store
    }

    pub fn supports_durable_log(&self) -> bool {
        self.supports_durable_log
    }

    pub fn cross_process_signaling_enabled(&self) -> bool {
        self.cross_process_signaling_enabled
    }

    pub fn is_queryable_log_store(&self) -> bool {
        self.is_queryable_log_store
    }
}

/// 单个存储的装配描述
#[derive(Clone, Builder)]
pub struct StoreDescriptor {
    /// 存储标识（在容器内唯一）
    store_id: String,
    /// 存储落盘位置；令牌侧车文件路径由此推导
    path: Option<PathBuf>,
    /// 能力探测结果
    #[builder(default)]
    capabilities: StoreCapabilities,
    /// 历史路径所需的事务日志句柄
    log: Option<Arc<dyn TransactionLog>>,
}

impl StoreDescriptor {
    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn capabilities(&self) -> &StoreCapabilities {
        &self.capabilities
    }

    pub fn log(&self) -> Option<&Arc<dyn TransactionLog>> {
        self.log.as_ref()
    }
}
