//! 日志事务（LogTransaction）
//!
//! 存储层持久化事务日志中的一条有序记录，对本子系统只读。
//! 同一存储内按令牌全序；时间戳相同的记录由日志内在顺序决定先后。
//!
use super::changed_identifiers::ChangedIdentifiers;
use super::token::ChangeToken;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct LogTransaction {
    /// 提交方标识（写入上下文的名称），可缺省
    author: Option<String>,
    /// 事务提交时间
    timestamp: DateTime<Utc>,
    /// 该事务触及的对象标识集
    changed: ChangedIdentifiers,
    /// 该事务在日志中的位点令牌
    token: ChangeToken,
}

impl LogTransaction {
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn changed(&self) -> &ChangedIdentifiers {
        &self.changed
    }

    pub fn token(&self) -> &ChangeToken {
        &self.token
    }
}
