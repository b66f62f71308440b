//! 嵌入式对象持久化的变更传播基础库（converge-domain）
//!
//! 提供让多个执行上下文收敛到一致已提交数据的通用抽象与构件：
//! - 变更模型（`change`）：令牌、对象标识、日志事务与聚合变更集
//! - 执行上下文刷新协议（`context`）与内存实现（`context_inmemory`）
//! - 持久化协议（`persist`）：事务日志、令牌侧车与存储能力探测
//! - 变更传播（`propagation`）：去重窗口、合并器、双路径通知器与分发器
//!
//! 本 crate 尽量保持与存储与传输实现解耦，仅定义传播层接口与最小必要的
//! 错误类型，以便在不同存储后端（例如 SQLite、嵌入式 KV 等）上进行适配实现。
//!
//! 典型用法：
//! 1. 为每个存储提供 `TransactionLog` 实现并探测 `StoreCapabilities`；
//! 2. 选择 `TokenStore` 实现（文件侧车或内存）；
//! 3. 实现 `ExecutionContext`，把合并落到共享只读上下文；
//! 4. 通过 `ChangePropagationDispatcher` 装配信号源与观察者，
//!    `enable` 之后提交变更即可在上下文之间收敛。
//!
pub mod change;
pub mod context;
pub mod context_inmemory;
pub mod error;
pub mod persist;
#[cfg(feature = "propagation")]
pub mod propagation;
