use serde::{Deserialize, Serialize};

use super::value_objects::MemberId;

/// 会員エンティティ
///
/// 逆参照は持たない。貸出とキューへの参加は書籍側から導出される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
