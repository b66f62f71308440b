//! 对象标识（ObjectId）与对象快照（ObjectSnapshot）
//!
//! `ObjectId` 携带实体类型与实体内键，订阅方可据此按实体类型做
//! 低成本的相关性判定；`ObjectSnapshot` 是提交负载中的"整对象"形态，
//! 统一归一化为标识形态后再进入传播流程。
//!
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// 持久化对象标识：实体类型 + 实体内键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    entity: String,
    key: String,
}

impl ObjectId {
    pub fn new(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// 实体类型（用于订阅方的相关性判定）
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.entity, self.key)
    }
}

/// 提交负载中的整对象形态，仅保留标识与属性值快照
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    id: ObjectId,
    values: serde_json::Value,
}

impl ObjectSnapshot {
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn values(&self) -> &serde_json::Value {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_display_joins_entity_and_key() {
        let id = ObjectId::new("Note", "n-1");
        assert_eq!(id.to_string(), "Note/n-1");
        assert_eq!(id.entity(), "Note");
        assert_eq!(id.key(), "n-1");
    }

    #[test]
    fn snapshot_keeps_identifier() {
        let snap = ObjectSnapshot::builder()
            .id(ObjectId::new("Note", "n-2"))
            .values(serde_json::json!({"title": "hello"}))
            .build();
        assert_eq!(snap.id().key(), "n-2");
        assert_eq!(snap.values()["title"], "hello");
    }
}
