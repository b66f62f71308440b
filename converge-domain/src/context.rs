//! 执行上下文（ExecutionContext）协议
//!
//! 执行上下文是同一逻辑存储之上的隔离读写视图。传播子系统只依赖
//! 这里定义的刷新协议：把已提交变更合并进共享只读上下文，
//! 使其缓存状态收敛到已提交数据。
//!
//! 合并必须幂等（同一事务合并两次与合并一次可观测结果一致），
//! 且必须可从任意线程并发调用。
//!
use crate::change::{ChangedIdentifiers, ObjectId};

/// 共享只读上下文的刷新协议
pub trait ExecutionContext: Send + Sync {
    /// 上下文名称（用于日志与合并事件的提交方标注）
    fn name(&self) -> &str;

    /// 将变更集合并进上下文，等价于对触及标识做缓存失效/刷新；幂等
    fn merge_changes(&self, changed: &ChangedIdentifiers);

    /// 强制刷新给定标识：已删除对象的依赖观察方需要据此感知删除
    fn refresh_objects(&self, ids: &[ObjectId]);
}
