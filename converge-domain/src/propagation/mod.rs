//! 变更传播子系统（propagation）
//!
//! 提供提交变更在执行上下文之间收敛所需的全部构件与运行时：
//! - `SeenTokenWindow`：跨通道令牌去重窗口；
//! - `ChangeSetMerger`：按提交方聚合变更集；
//! - `LegacyChangeNotifier`：同进程提交信号的兼容传播路径；
//! - `HistoryChangeNotifier`：持久化日志驱动的历史传播路径；
//! - `ChangePropagationDispatcher`：路径选择、生命周期与事件发布；
//! - `ChangeObserver`/信号协议与内存信号枢纽。
//!
//! 该模块仅定义协议与编排逻辑，不绑定具体存储后端，可对接任意
//! 满足 `TransactionLog`/`TokenStore` 协议的实现。
//!
pub mod dispatcher;
pub mod history;
pub mod legacy;
pub mod merger;
pub mod observer;
pub mod signal;
pub mod signal_hub;
pub mod window;

pub use dispatcher::{ChangePropagationDispatcher, DispatcherConfig, DispatcherHandle};
pub use history::{DEFAULT_RETENTION_WINDOW, HistoryChangeNotifier, UNKNOWN_AUTHOR};
pub use legacy::LegacyChangeNotifier;
pub use merger::ChangeSetMerger;
pub use observer::{ChangeObserver, ObservedEntities};
pub use signal::{
    CommitChanges, CommitSignal, CommitSignalSource, LogChangedSignal, LogSignalSource,
};
pub use signal_hub::SignalHub;
pub use window::{DEFAULT_WINDOW_CAPACITY, SeenTokenWindow};
