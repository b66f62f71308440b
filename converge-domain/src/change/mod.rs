//! 变更模型（change）
//!
//! 变更传播流程中流转的数据形态：
//! - `ChangeToken`：存储内事务日志位点令牌；
//! - `ObjectId`/`ObjectSnapshot`：对象标识与整对象快照；
//! - `ChangedIdentifiers`：标识形态变更集；
//! - `LogTransaction`：持久化日志中的一条事务记录；
//! - `AggregatedChangeSet`/`CoalescedEvent`：按提交方聚合的发布载荷。
//!
mod aggregated;
mod changed_identifiers;
mod log_transaction;
mod object_id;
mod token;

pub use aggregated::{AggregatedChangeSet, CoalescedEvent};
pub use changed_identifiers::ChangedIdentifiers;
pub use log_transaction::LogTransaction;
pub use object_id::{ObjectId, ObjectSnapshot};
pub use token::ChangeToken;
