//! 传播信号（signal）协议
//!
//! 两条投递通道各自的信号形态与订阅协议：
//! - `CommitSignal`：同进程"上下文已提交"信号（兼容路径）；
//! - `LogChangedSignal`：跨进程"日志已变更"信号（历史路径）。
//!
//! 订阅接口返回 `'static` 生命周期的信号流，便于在 `tokio::spawn`
//! 中消费；信号可能到达于任意线程。
//!
use crate::change::{ChangeToken, ChangedIdentifiers, ObjectSnapshot};
use crate::error::StoreResult;
use async_trait::async_trait;
use bon::Builder;
use futures_core::stream::BoxStream;

/// 提交负载的两种形态：标识集，或可派生标识的整对象集
#[derive(Debug, Clone)]
pub enum CommitChanges {
    Identifiers(ChangedIdentifiers),
    Objects {
        inserted: Vec<ObjectSnapshot>,
        updated: Vec<ObjectSnapshot>,
        deleted: Vec<ObjectSnapshot>,
    },
}

impl CommitChanges {
    /// 统一归一化为标识形态
    pub fn normalized(&self) -> ChangedIdentifiers {
        match self {
            CommitChanges::Identifiers(changed) => changed.clone(),
            CommitChanges::Objects {
                inserted,
                updated,
                deleted,
            } => ChangedIdentifiers::from_objects(inserted, updated, deleted),
        }
    }
}

/// 同进程提交信号；`changes` 缺失即"无相关变更"，跳过而非报错
#[derive(Debug, Clone, Builder)]
pub struct CommitSignal {
    /// 提交发生的存储
    store_id: String,
    /// 提交方上下文名称（合并事件按它聚合）
    context_name: String,
    /// 提交负载；不完整的负载置 `None`
    changes: Option<CommitChanges>,
    /// 去重令牌；存在时经由已见令牌窗口判定
    token: Option<ChangeToken>,
}

impl CommitSignal {
    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    pub fn changes(&self) -> Option<&CommitChanges> {
        self.changes.as_ref()
    }

    pub fn token(&self) -> Option<&ChangeToken> {
        self.token.as_ref()
    }
}

/// 跨进程日志变更信号；`token` 可缺省（仅提示"有新事务"）
#[derive(Debug, Clone)]
pub struct LogChangedSignal {
    store_id: String,
    token: Option<ChangeToken>,
}

impl LogChangedSignal {
    pub fn new(store_id: impl Into<String>, token: Option<ChangeToken>) -> Self {
        Self {
            store_id: store_id.into(),
            token,
        }
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn token(&self) -> Option<&ChangeToken> {
        self.token.as_ref()
    }
}

/// 同进程提交信号的订阅协议
#[async_trait]
pub trait CommitSignalSource: Send + Sync {
    async fn subscribe(&self) -> BoxStream<'static, StoreResult<CommitSignal>>;
}

/// 跨进程日志变更信号的订阅协议
#[async_trait]
pub trait LogSignalSource: Send + Sync {
    async fn subscribe(&self) -> BoxStream<'static, StoreResult<LogChangedSignal>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ObjectId;

    #[test]
    fn object_shape_normalizes() {
        let snap = ObjectSnapshot::builder()
            .id(ObjectId::new("Note", "n-1"))
            .values(serde_json::json!({}))
            .build();
        let changes = CommitChanges::Objects {
            inserted: vec![snap],
            updated: vec![],
            deleted: vec![],
        };
        let changed = changes.normalized();
        assert_eq!(changed.inserted(), &[ObjectId::new("Note", "n-1")]);
    }
}
