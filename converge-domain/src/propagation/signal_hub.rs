//! 内存版信号枢纽（SignalHub）
//!
//! 基于 `tokio::sync::broadcast` 的轻量信号分发，同时满足
//! `CommitSignalSource` 与 `LogSignalSource` 两个协议：
//! - 写入端在提交/追加日志后调用 `publish_*` 广播信号；
//! - 订阅端拿到 `'static` 生命周期信号流，便于在 `tokio::spawn` 中使用；
//! - 典型用途：测试环境、示例与同进程部署。
//!
//! 注意：若无订阅者时发送将被忽略，信号本身不承载可靠投递语义；
//! 历史路径的正确性由令牌区间拉取保证，信号只是触发器。
//!
use super::signal::{CommitSignal, CommitSignalSource, LogChangedSignal, LogSignalSource};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// 简单的内存信号枢纽实现
#[derive(Clone)]
pub struct SignalHub {
    commit_tx: broadcast::Sender<CommitSignal>,
    log_tx: broadcast::Sender<LogChangedSignal>,
}

impl SignalHub {
    /// 创建信号枢纽，`capacity` 为每条通道的广播缓冲区容量
    pub fn new(capacity: usize) -> Self {
        let (commit_tx, _rx) = broadcast::channel(capacity);
        let (log_tx, _rx) = broadcast::channel(capacity);
        Self { commit_tx, log_tx }
    }

    /// 广播一条同进程提交信号
    pub fn publish_commit(&self, signal: CommitSignal) {
        // 无订阅者时 send 返回错误，视为非致命并忽略
        let _ = self.commit_tx.send(signal);
    }

    /// 广播一条日志变更信号
    pub fn publish_log_changed(&self, signal: LogChangedSignal) {
        let _ = self.log_tx.send(signal);
    }
}

#[async_trait]
impl CommitSignalSource for SignalHub {
    async fn subscribe(&self) -> BoxStream<'static, StoreResult<CommitSignal>> {
        let rx = self.commit_tx.subscribe();
        Box::pin(BroadcastStream::new(rx).map(|r| {
            r.map_err(|e| StoreError::SignalChannel {
                reason: e.to_string(),
            })
        }))
    }
}

#[async_trait]
impl LogSignalSource for SignalHub {
    async fn subscribe(&self) -> BoxStream<'static, StoreResult<LogChangedSignal>> {
        let rx = self.log_tx.subscribe();
        Box::pin(BroadcastStream::new(rx).map(|r| {
            r.map_err(|e| StoreError::SignalChannel {
                reason: e.to_string(),
            })
        }))
    }
}
