//! 聚合变更集（AggregatedChangeSet）与合并事件（CoalescedEvent）
//!
//! 一次传播周期内按提交方聚合的变更结果：
//! - 聚合变更集由多个共享片段（`Arc` 切片）惰性拼接而成，
//!   迭代可重复发起，绝不物化合并集合；
//! - 合并事件是发布给外部订阅者的容器级载荷，
//!   提供按实体类型的低成本相关性判定。
//!
use super::object_id::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;

type Segment = Arc<[ObjectId]>;

/// 按提交方聚合的标识集，由共享片段惰性拼接
#[derive(Debug, Clone, Default)]
pub struct AggregatedChangeSet {
    inserted: Vec<Segment>,
    updated: Vec<Segment>,
    deleted: Vec<Segment>,
}

impl AggregatedChangeSet {
    pub(crate) fn from_segments(
        inserted: Vec<Segment>,
        updated: Vec<Segment>,
        deleted: Vec<Segment>,
    ) -> Self {
        Self {
            inserted,
            updated,
            deleted,
        }
    }

    /// 惰性遍历插入标识；每次调用都从头开始一次新的遍历
    pub fn inserted(&self) -> impl Iterator<Item = &ObjectId> {
        self.inserted.iter().flat_map(|s| s.iter())
    }

    pub fn updated(&self) -> impl Iterator<Item = &ObjectId> {
        self.updated.iter().flat_map(|s| s.iter())
    }

    pub fn deleted(&self) -> impl Iterator<Item = &ObjectId> {
        self.deleted.iter().flat_map(|s| s.iter())
    }

    /// 遍历全部触及的标识（插入、更新、删除）
    pub fn all(&self) -> impl Iterator<Item = &ObjectId> {
        self.inserted()
            .chain(self.updated())
            .chain(self.deleted())
    }

    pub fn is_empty(&self) -> bool {
        // 片段在合并时即剔除空集，这里只需检查片段列表
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// 是否触及给定实体类型之一；短路判定，不物化标识列表
    pub fn touches_entities(&self, entities: &[&str]) -> bool {
        self.all().any(|id| entities.contains(&id.entity()))
    }
}

/// 一次传播周期发布的容器级合并事件：提交方 -> 聚合变更集
#[derive(Debug, Clone, Default)]
pub struct CoalescedEvent {
    changes: HashMap<String, AggregatedChangeSet>,
}

impl CoalescedEvent {
    pub(crate) fn new(changes: HashMap<String, AggregatedChangeSet>) -> Self {
        Self { changes }
    }

    pub(crate) fn single(author: impl Into<String>, set: AggregatedChangeSet) -> Self {
        let mut changes = HashMap::new();
        changes.insert(author.into(), set);
        Self { changes }
    }

    /// 本次事件涉及的提交方
    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn changes_by(&self, author: &str) -> Option<&AggregatedChangeSet> {
        self.changes.get(author)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregatedChangeSet)> {
        self.changes.iter().map(|(a, s)| (a.as_str(), s))
    }

    pub fn is_empty(&self) -> bool {
        self.changes.values().all(AggregatedChangeSet::is_empty)
    }

    /// 订阅方相关性判定：是否触及给定实体类型之一
    pub fn has_changes(&self, entities: &[&str]) -> bool {
        self.changes.values().any(|s| s.touches_entities(entities))
    }
}
