//! 变更集合并器（ChangeSetMerger）
//!
//! 把一条或多条原始变更集累积为按提交方聚合的结果集：
//! - `merge` 可重复调用，内部只登记共享片段，不做 O(n) 拷贝；
//! - `build` 为纯函数，可多次调用，反映到目前为止的全部合并；
//! - 产出的 `AggregatedChangeSet` 惰性拼接各片段，调用方只需
//!   成员判定时无须物化潜在的大集合。
//!
use crate::change::{AggregatedChangeSet, ChangedIdentifiers, ObjectId, ObjectSnapshot};
use std::sync::Arc;

type Segment = Arc<[ObjectId]>;

/// 按类别累积共享片段的合并器
#[derive(Debug, Clone, Default)]
pub struct ChangeSetMerger {
    inserted: Vec<Segment>,
    updated: Vec<Segment>,
    deleted: Vec<Segment>,
}

impl ChangeSetMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一条标识形态变更集；空类别不登记片段
    pub fn merge(&mut self, changed: ChangedIdentifiers) {
        fn push(segments: &mut Vec<Segment>, ids: Vec<ObjectId>) {
            if !ids.is_empty() {
                segments.push(ids.into());
            }
        }
        let (inserted, updated, deleted) = changed.into_parts();
        push(&mut self.inserted, inserted);
        push(&mut self.updated, updated);
        push(&mut self.deleted, deleted);
    }

    /// 合并整对象形态的变更集（归一化为标识形态）
    pub fn merge_objects(
        &mut self,
        inserted: &[ObjectSnapshot],
        updated: &[ObjectSnapshot],
        deleted: &[ObjectSnapshot],
    ) {
        self.merge(ChangedIdentifiers::from_objects(inserted, updated, deleted));
    }

    /// 组合当前已合并的全部片段；可多次调用，互不干扰
    pub fn build(&self) -> AggregatedChangeSet {
        AggregatedChangeSet::from_segments(
            self.inserted.clone(),
            self.updated.clone(),
            self.deleted.clone(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}
