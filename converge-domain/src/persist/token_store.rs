//! 令牌持久化（TokenStore）
//!
//! 每个存储一份"最近已处理令牌"的侧车持久化：
//! - 侧车路径由存储位置确定性推导（`<store-path>.tokendata`）；
//! - 自描述、带版本号的 JSON 编码；
//! - `load` 对"文件缺失"与"内容损坏"一视同仁地返回 `None`：
//!   丢失令牌只意味着有界的重放，启动失败才是不可接受的；
//! - `save` 相对合并周期同步写穿，内存游标只在落盘成功后推进。
//!
use super::store::StoreDescriptor;
use crate::change::ChangeToken;
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// 侧车编码版本号
const TOKEN_RECORD_VERSION: u32 = 1;

/// 侧车文件内容：自描述、带版本号
#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    version: u32,
    saved_at: DateTime<Utc>,
    token: ChangeToken,
}

/// 令牌持久化协议
pub trait TokenStore: Send + Sync {
    /// 写穿保存；失败时调用方不得推进内存游标
    fn save(&self, store_id: &str, token: &ChangeToken) -> StoreResult<()>;

    /// 读取最近已处理令牌；缺失与损坏都返回 `None`
    fn load(&self, store_id: &str) -> Option<ChangeToken>;
}

/// 由存储位置推导令牌侧车路径
pub fn sidecar_path(store_path: &Path) -> PathBuf {
    let mut os: OsString = store_path.as_os_str().to_os_string();
    os.push(".tokendata");
    PathBuf::from(os)
}

/// 文件侧车实现：每个存储一个 `.tokendata` 文件
pub struct FileTokenStore {
    paths: HashMap<String, PathBuf>,
}

impl FileTokenStore {
    /// 从存储描述装配；没有落盘位置的存储不参与令牌持久化
    pub fn for_descriptors(descriptors: &[StoreDescriptor]) -> Self {
        let paths = descriptors
            .iter()
            .filter_map(|d| d.path().map(|p| (d.store_id().to_string(), sidecar_path(p))))
            .collect();
        Self { paths }
    }

    fn path_for(&self, store_id: &str) -> StoreResult<&PathBuf> {
        self.paths
            .get(store_id)
            .ok_or_else(|| StoreError::UnknownStore(store_id.to_string()))
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, store_id: &str, token: &ChangeToken) -> StoreResult<()> {
        let path = self.path_for(store_id)?;
        let record = TokenRecord {
            version: TOKEN_RECORD_VERSION,
            saved_at: Utc::now(),
            token: token.clone(),
        };
        let encoded = serde_json::to_vec(&record)?;

        // 先写临时文件再原子改名，避免半写状态被下次 load 读到
        let mut tmp: OsString = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let persist = |e: std::io::Error| StoreError::TokenPersistence {
            store: store_id.to_string(),
            reason: e.to_string(),
        };
        fs::write(&tmp, &encoded).map_err(persist)?;
        fs::rename(&tmp, path).map_err(persist)?;
        Ok(())
    }

    fn load(&self, store_id: &str) -> Option<ChangeToken> {
        let path = self.paths.get(store_id)?;
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(store_id, reason = %e, "token sidecar missing, replaying retained history");
                return None;
            }
        };
        match serde_json::from_slice::<TokenRecord>(&raw) {
            Ok(record) if record.version == TOKEN_RECORD_VERSION => Some(record.token),
            Ok(record) => {
                debug!(store_id, version = record.version, "token sidecar version unknown, ignoring");
                None
            }
            Err(e) => {
                debug!(store_id, reason = %e, "token sidecar corrupted, replaying retained history");
                None
            }
        }
    }
}

/// 内存实现：测试与示例用
#[derive(Default)]
pub struct InMemoryTokenStore {
    inner: Mutex<HashMap<String, ChangeToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn save(&self, store_id: &str, token: &ChangeToken) -> StoreResult<()> {
        self.inner
            .lock()
            .expect("token store lock")
            .insert(store_id.to_string(), token.clone());
        Ok(())
    }

    fn load(&self, store_id: &str) -> Option<ChangeToken> {
        self.inner.lock().expect("token store lock").get(store_id).cloned()
    }
}
