//! 变更令牌（ChangeToken）
//!
//! 指向单个存储内部事务日志的不透明位点标记：
//! - 同一存储内按字节序全序比较；
//! - 不同存储之间的令牌不可比较；
//! - 令牌不可变，只会被更新的令牌整体替换。
//!
use serde::{Deserialize, Serialize};

/// 不透明、可按字节比较的日志位点令牌
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeToken(Vec<u8>);

impl ChangeToken {
    /// 由存储层给出的原始字节构造令牌
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// 由单调递增序号构造令牌（大端编码，字节序与数值序一致）
    pub fn from_sequence(sequence: u64) -> Self {
        Self(sequence.to_be_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ChangeToken {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_tokens_order_matches_numeric_order() {
        let t1 = ChangeToken::from_sequence(1);
        let t2 = ChangeToken::from_sequence(2);
        let t300 = ChangeToken::from_sequence(300);
        assert!(t1 < t2);
        assert!(t2 < t300);
    }

    #[test]
    fn byte_tokens_compare_lexicographically() {
        let a = ChangeToken::from_bytes(vec![0x01, 0x02]);
        let b = ChangeToken::from_bytes(vec![0x01, 0x03]);
        assert!(a < b);
        assert_eq!(a, ChangeToken::from_bytes(vec![0x01, 0x02]));
    }
}
