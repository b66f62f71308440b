//! 内存版执行上下文（InMemoryContext）
//!
//! 满足 `ExecutionContext` 协议的参考实现：
//! - 以标识 -> 刷新代数的映射模拟"已加载对象"的缓存状态；
//! - 合并幂等：同一事务合并两次，存活/删除集不变；
//! - 典型用途：测试环境、示例与本地开发。
//!
use crate::change::{ChangedIdentifiers, ObjectId};
use crate::context::ExecutionContext;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct ContextState {
    /// 存活对象 -> 被强制刷新的次数
    live: HashMap<ObjectId, usize>,
    /// 已删除对象集合
    removed: HashSet<ObjectId>,
}

/// 简单的内存上下文实现
pub struct InMemoryContext {
    name: String,
    state: Mutex<ContextState>,
}

impl InMemoryContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(ContextState::default()),
        }
    }

    /// 当前存活对象标识集
    pub fn live_ids(&self) -> HashSet<ObjectId> {
        self.state.lock().expect("context lock").live.keys().cloned().collect()
    }

    /// 已删除对象标识集
    pub fn removed_ids(&self) -> HashSet<ObjectId> {
        self.state.lock().expect("context lock").removed.clone()
    }

    /// 给定标识被强制刷新的次数
    pub fn refresh_count(&self, id: &ObjectId) -> usize {
        self.state
            .lock()
            .expect("context lock")
            .live
            .get(id)
            .copied()
            .unwrap_or(0)
    }
}

impl ExecutionContext for InMemoryContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge_changes(&self, changed: &ChangedIdentifiers) {
        let mut state = self.state.lock().expect("context lock");
        for id in changed.inserted().iter().chain(changed.updated()) {
            state.live.entry(id.clone()).or_insert(0);
            state.removed.remove(id);
        }
        for id in changed.deleted() {
            state.live.remove(id);
            state.removed.insert(id.clone());
        }
    }

    fn refresh_objects(&self, ids: &[ObjectId]) {
        let mut state = self.state.lock().expect("context lock");
        for id in ids {
            // 删除对象的刷新只需保证观察方被唤醒，这里仅对存活对象计数
            if let Some(count) = state.live.get_mut(id) {
                *count += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(keys: &[&str]) -> Vec<ObjectId> {
        keys.iter().map(|k| ObjectId::new("Note", *k)).collect()
    }

    #[test]
    fn merge_is_idempotent() {
        let ctx = InMemoryContext::new("viewer");
        let changed = ChangedIdentifiers::new(ids(&["a", "b"]), vec![], ids(&["c"]));

        ctx.merge_changes(&changed);
        let once_live = ctx.live_ids();
        let once_removed = ctx.removed_ids();

        ctx.merge_changes(&changed);
        assert_eq!(ctx.live_ids(), once_live);
        assert_eq!(ctx.removed_ids(), once_removed);
    }

    #[test]
    fn deletion_wins_over_earlier_insert() {
        let ctx = InMemoryContext::new("viewer");
        ctx.merge_changes(&ChangedIdentifiers::new(ids(&["a"]), vec![], vec![]));
        ctx.merge_changes(&ChangedIdentifiers::new(vec![], vec![], ids(&["a"])));
        assert!(ctx.live_ids().is_empty());
        assert!(ctx.removed_ids().contains(&ObjectId::new("Note", "a")));
    }

    #[test]
    fn refresh_only_counts_live_objects() {
        let ctx = InMemoryContext::new("viewer");
        ctx.merge_changes(&ChangedIdentifiers::new(ids(&["a"]), vec![], vec![]));
        ctx.refresh_objects(&ids(&["a", "missing"]));
        assert_eq!(ctx.refresh_count(&ObjectId::new("Note", "a")), 1);
        assert_eq!(ctx.refresh_count(&ObjectId::new("Note", "missing")), 0);
    }
}
