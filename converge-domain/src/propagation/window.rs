//! 已见令牌窗口（SeenTokenWindow）
//!
//! 有界、线程安全的 FIFO 令牌集合，用于跨通道去重：
//! 同一令牌经由多条投递通道（同进程提交信号、跨进程日志信号）到达时，
//! 只有第一次 `should_process` 返回 `true`。
//!
//! 语义刻意不对称：令牌只在"已见"分支之后才被记住，而不是先登记再处理，
//! 因此常见的单通道投递只花一次插入。容量满时静默淘汰最旧条目：
//! 过早淘汰最多导致一次无害的重复合并（合并幂等），绝不会丢变更。
//!
use crate::change::ChangeToken;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// 默认窗口容量（可调参数，按分发器实例计，非按存储计）
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

#[derive(Default)]
struct WindowState {
    /// 成员判定的事实来源
    seen: HashSet<ChangeToken>,
    /// FIFO 淘汰顺序；可能含已移除的陈旧条目，淘汰时跳过
    order: VecDeque<ChangeToken>,
}

/// 有界 FIFO 去重窗口；单把互斥锁保护，操作均摊 O(1)
pub struct SeenTokenWindow {
    capacity: usize,
    state: Mutex<WindowState>,
}

impl Default for SeenTokenWindow {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }
}

impl SeenTokenWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(WindowState::default()),
        }
    }

    /// 该令牌是否应当被处理。
    /// - 已在窗口内：移除并返回 `false`（另一通道已处理）；
    /// - 不在窗口内：记入窗口（满则淘汰最旧）并返回 `true`。
    pub fn should_process(&self, token: &ChangeToken) -> bool {
        let mut state = self.state.lock().expect("window lock");
        if state.seen.remove(token) {
            return false;
        }
        if state.seen.len() >= self.capacity {
            // order 里可能有陈旧条目，弹到一个仍存活的为止
            while let Some(oldest) = state.order.pop_front() {
                if state.seen.remove(&oldest) {
                    break;
                }
            }
        }
        state.seen.insert(token.clone());
        state.order.push_back(token.clone());
        true
    }

    /// 当前窗口内令牌数（测试用）
    pub fn len(&self) -> usize {
        self.state.lock().expect("window lock").seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
