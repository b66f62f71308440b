//! 变更观察者（ChangeObserver）
//!
//! 定义消费容器级合并事件的观察者协议与元信息（名称、关注的实体类型）。
//! 观察者回调统一在分发器的发布任务上顺序执行，观察方得到单线程视角。
//!
use crate::change::CoalescedEvent;
use async_trait::async_trait;

/// 观察者关注的实体类型
#[derive(Clone, Debug)]
pub enum ObservedEntities {
    One(String),
    Many(Vec<String>),
    All,
}

impl ObservedEntities {
    /// 给定事件是否与关注范围相关；按实体类型短路判定
    pub fn matches(&self, event: &CoalescedEvent) -> bool {
        match self {
            ObservedEntities::All => true,
            ObservedEntities::One(entity) => event.has_changes(&[entity.as_str()]),
            ObservedEntities::Many(entities) => {
                let entities: Vec<&str> = entities.iter().map(String::as_str).collect();
                event.has_changes(&entities)
            }
        }
    }
}

/// 变更观察者：处理一次传播周期的合并事件
#[async_trait]
pub trait ChangeObserver: Send + Sync {
    /// 观察者名称（用于失败日志与审计）
    fn observer_name(&self) -> &str;
    /// 返回该观察者关注的实体类型
    fn observed_entities(&self) -> ObservedEntities;
    /// 处理合并事件
    async fn handle(&self, event: &CoalescedEvent) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{AggregatedChangeSet, ChangedIdentifiers, ObjectId};
    use crate::propagation::merger::ChangeSetMerger;

    fn event_touching(entity: &str) -> CoalescedEvent {
        let mut merger = ChangeSetMerger::new();
        merger.merge(ChangedIdentifiers::new(
            vec![ObjectId::new(entity, "x")],
            vec![],
            vec![],
        ));
        CoalescedEvent::single("writer", merger.build())
    }

    #[test]
    fn matching_by_entity_kind() {
        let event = event_touching("Note");
        assert!(ObservedEntities::All.matches(&event));
        assert!(ObservedEntities::One("Note".into()).matches(&event));
        assert!(!ObservedEntities::One("Tag".into()).matches(&event));
        assert!(ObservedEntities::Many(vec!["Tag".into(), "Note".into()]).matches(&event));
    }

    #[test]
    fn empty_event_matches_all_only() {
        let event = CoalescedEvent::single("writer", AggregatedChangeSet::default());
        assert!(ObservedEntities::All.matches(&event));
        assert!(!ObservedEntities::One("Note".into()).matches(&event));
    }
}
