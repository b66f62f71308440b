//! 持久化协议与实现（persist）
//!
//! 定义传播子系统依赖的两类持久化面：
//! - 事务日志查询与保留期清理（`TransactionLog`）；
//! - "最近已处理令牌"的侧车持久化（`TokenStore`/`FileTokenStore`）；
//! - 存储能力探测与装配描述（`StoreCapabilities`/`StoreDescriptor`）。
//!
//! 该模块聚焦协议与装配逻辑，具体存储后端由上层提供实现并注入；
//! 内存实现仅用于测试、示例与本地开发。
//!
mod log_inmemory;
mod store;
mod token_store;
mod transaction_log;

pub use log_inmemory::InMemoryTransactionLog;
pub use store::{StoreCapabilities, StoreDescriptor};
pub use token_store::{FileTokenStore, InMemoryTokenStore, TokenStore, sidecar_path};
pub use transaction_log::TransactionLog;
