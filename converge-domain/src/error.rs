//! 存储层统一错误定义
//!
//! 聚焦令牌持久化、事务日志读取、信号通道与上下文刷新等最小必要集合，
//! 便于在各实现层统一转换为 `StoreError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    // --- 序列化/编码 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid token encoding: {reason}")]
    InvalidToken { reason: String },

    // --- 令牌持久化 ---
    #[error("token persistence error: store={store}, reason={reason}")]
    TokenPersistence { store: String, reason: String },

    // --- 事务日志 ---
    #[error("transaction log error: store={store}, reason={reason}")]
    TransactionLog { store: String, reason: String },
    #[error("history purge error: store={store}, reason={reason}")]
    Purge { store: String, reason: String },

    // --- 信号与分发 ---
    #[error("signal channel error: {reason}")]
    SignalChannel { reason: String },
    #[error("change observer error: observer={observer}, reason={reason}")]
    Observer { observer: String, reason: String },

    // --- 通用 ---
    #[error("unknown store: {0}")]
    UnknownStore(String),
}

/// 统一 Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;
