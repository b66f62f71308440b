//! 容器级应用层（converge-application）
//!
//! 在 `converge-domain` 之上提供面向宿主应用的装配与管理面：
//! - `ObserverRegistry`：进程内观察者注册表；
//! - `StoreContainer`：装配、生命周期与历史管理操作；
//! - `AppError`：应用层统一错误。
//!
pub mod container;
pub mod dto;
pub mod error;
pub mod registry;

pub use container::StoreContainer;
pub use dto::HistorySummary;
pub use error::AppError;
pub use registry::ObserverRegistry;
