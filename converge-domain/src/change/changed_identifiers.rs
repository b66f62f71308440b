//! 标识形态变更集（ChangedIdentifiers）
//!
//! 单次提交或单条日志事务所触及的对象标识，按插入/更新/删除分组。
//! 这是传播流程内部的统一形态：整对象形态的提交负载会先归一化到这里。
//!
use super::object_id::{ObjectId, ObjectSnapshot};
use serde::{Deserialize, Serialize};

/// 按变更类别分组的对象标识集
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangedIdentifiers {
    inserted: Vec<ObjectId>,
    updated: Vec<ObjectId>,
    deleted: Vec<ObjectId>,
}

impl ChangedIdentifiers {
    pub fn new(inserted: Vec<ObjectId>, updated: Vec<ObjectId>, deleted: Vec<ObjectId>) -> Self {
        Self {
            inserted,
            updated,
            deleted,
        }
    }

    /// 从整对象形态派生标识形态
    pub fn from_objects(
        inserted: &[ObjectSnapshot],
        updated: &[ObjectSnapshot],
        deleted: &[ObjectSnapshot],
    ) -> Self {
        let ids = |objects: &[ObjectSnapshot]| objects.iter().map(|o| o.id().clone()).collect();
        Self {
            inserted: ids(inserted),
            updated: ids(updated),
            deleted: ids(deleted),
        }
    }

    pub fn inserted(&self) -> &[ObjectId] {
        &self.inserted
    }

    pub fn updated(&self) -> &[ObjectId] {
        &self.updated
    }

    pub fn deleted(&self) -> &[ObjectId] {
        &self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// 拆出三个类别的所有权（合并器零拷贝登记用）
    pub fn into_parts(self) -> (Vec<ObjectId>, Vec<ObjectId>, Vec<ObjectId>) {
        (self.inserted, self.updated, self.deleted)
    }
}
