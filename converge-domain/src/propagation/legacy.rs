//! 兼容路径变更通知器（LegacyChangeNotifier）
//!
//! 供无法提供持久化跨进程日志的存储使用：只订阅写入上下文的
//! 同进程"已提交"信号，把提交负载直接合并进共享只读上下文。
//! 除共享的已见令牌窗口外无自身状态，每个信号独立处理。
//!
use super::signal::CommitSignal;
use super::window::SeenTokenWindow;
use crate::change::CoalescedEvent;
use crate::context::ExecutionContext;
use crate::propagation::merger::ChangeSetMerger;
use std::sync::Arc;
use tracing::debug;

pub struct LegacyChangeNotifier {
    context: Arc<dyn ExecutionContext>,
    window: Arc<SeenTokenWindow>,
}

impl LegacyChangeNotifier {
    pub fn new(context: Arc<dyn ExecutionContext>, window: Arc<SeenTokenWindow>) -> Self {
        Self { context, window }
    }

    /// 处理一条提交信号；返回待发布的合并事件。
    /// 负载缺失或为空视为"无相关变更"，跳过而非报错。
    pub fn handle_commit(&self, signal: &CommitSignal) -> Option<CoalescedEvent> {
        if let Some(token) = signal.token()
            && !self.window.should_process(token)
        {
            debug!(
                store_id = signal.store_id(),
                "commit already propagated via another channel, skipping"
            );
            return None;
        }

        let Some(changes) = signal.changes() else {
            debug!(
                store_id = signal.store_id(),
                "commit payload incomplete, treating as no relevant change"
            );
            return None;
        };
        let changed = changes.normalized();
        if changed.is_empty() {
            return None;
        }

        self.context.merge_changes(&changed);
        // 仅删除的提交对已加载对象不可见，强制刷新让依赖观察方感知
        if !changed.deleted().is_empty() {
            self.context.refresh_objects(changed.deleted());
        }

        let mut merger = ChangeSetMerger::new();
        merger.merge(changed);
        Some(CoalescedEvent::single(signal.context_name(), merger.build()))
    }
}
