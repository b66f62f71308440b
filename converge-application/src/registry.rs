//! 进程内观察者注册表
//!
//! 以名称为键并发注册/注销变更观察者；装配容器时取一次快照
//! 交给分发器。注册发生在装配之前，装配之后的改动对已启用的
//! 分发器不生效。
//!
use crate::error::AppError;
use converge_domain::propagation::ChangeObserver;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// 进程内（非分布式）的观察者注册表
/// - 以观察者名称为键，重复注册报错
/// - 并发安全，可在装配前由多处注册
#[derive(Default)]
pub struct ObserverRegistry {
    observers: DashMap<String, Arc<dyn ChangeObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册观察者；名称重复时报错
    pub fn register(&self, observer: Arc<dyn ChangeObserver>) -> Result<(), AppError> {
        let name = observer.observer_name().to_string();
        match self.observers.entry(name) {
            Entry::Occupied(occupied) => Err(AppError::ObserverAlreadyRegistered {
                name: occupied.key().clone(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(observer);
                Ok(())
            }
        }
    }

    pub fn unregister(&self, name: &str) -> Result<(), AppError> {
        self.observers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AppError::ObserverNotFound(name.to_string()))
    }

    /// 当前全部观察者的快照
    pub fn snapshot(&self) -> Vec<Arc<dyn ChangeObserver>> {
        self.observers.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use converge_domain::change::CoalescedEvent;
    use converge_domain::propagation::ObservedEntities;

    struct NamedObserver(&'static str);

    #[async_trait]
    impl ChangeObserver for NamedObserver {
        fn observer_name(&self) -> &str {
            self.0
        }
        fn observed_entities(&self) -> ObservedEntities {
            ObservedEntities::All
        }
        async fn handle(&self, _event: &CoalescedEvent) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = ObserverRegistry::new();
        registry.register(Arc::new(NamedObserver("a"))).unwrap();
        let err = registry.register(Arc::new(NamedObserver("a"))).unwrap_err();
        assert!(matches!(err, AppError::ObserverAlreadyRegistered { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes_observer() {
        let registry = ObserverRegistry::new();
        registry.register(Arc::new(NamedObserver("a"))).unwrap();
        registry.unregister("a").unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.unregister("a"),
            Err(AppError::ObserverNotFound(_))
        ));
    }
}
