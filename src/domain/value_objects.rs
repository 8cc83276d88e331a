use serde::{Deserialize, Serialize};

/// 書籍ID - 外部システムが採番する不透明な文字列
///
/// UUIDのような形式は仮定しない。空文字列の拒否はサービス層の責務。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// 会員ID - 外部システムが採番する不透明な文字列
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_round_trip() {
        let id = BookId::new("b1");
        assert_eq!(id.as_str(), "b1");
        assert_eq!(id.to_string(), "b1");
    }

    #[test]
    fn test_member_id_equality_is_by_value() {
        assert_eq!(MemberId::new("m1"), MemberId::from("m1"));
        assert_ne!(MemberId::new("m1"), MemberId::new("m2"));
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let mut ids = vec![BookId::new("b2"), BookId::new("b10"), BookId::new("b1")];
        ids.sort();
        assert_eq!(
            ids,
            vec![BookId::new("b1"), BookId::new("b10"), BookId::new("b2")]
        );
    }
}
