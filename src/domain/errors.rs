use serde::{Deserialize, Serialize};

/// ドメイン操作の拒否理由
///
/// ワイヤフォーマットの`reason`文字列と1対1で対応する閉じた列挙。
/// リポジトリ障害（ストレージ不可など）はここには含まれず、
/// アプリケーション層のシステムエラーとして伝播する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// 書籍が存在しない
    BookNotFound,
    /// 会員が存在しない
    MemberNotFound,
    /// 同じIDの書籍が既に存在する
    BookAlreadyExists,
    /// 同じIDの会員が既に存在する
    MemberAlreadyExists,
    /// 必須フィールドが欠けている（空のID・タイトル・名前）
    InvalidRequest,
    /// 貸出上限（5冊）に達している
    BorrowLimit,
    /// 自分が既に借りている
    AlreadyBorrowed,
    /// 他の会員が借りている
    BookUnavailable,
    /// 予約キューの先頭が別の会員
    Reserved,
    /// 既に予約キューに入っている
    AlreadyReserved,
    /// 予約キューに入っていない
    NotReserved,
    /// 延長日数が0
    InvalidExtension,
    /// 貸出されていない
    NotLoaned,
    /// 借り手ではない
    NotBorrower,
    /// 予約が存在するため延長不可
    ReservationExists,
    /// 初回返却期限から90日を超える延長
    MaxExtensionReached,
    /// 貸出中の書籍は削除不可
    BookLoaned,
    /// 予約中の書籍は削除不可
    BookReserved,
    /// 貸出中の書籍を持つ会員は削除不可
    MemberHasLoans,
}

impl RejectReason {
    /// ワイヤフォーマット用の安定した文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::BookNotFound => "BOOK_NOT_FOUND",
            RejectReason::MemberNotFound => "MEMBER_NOT_FOUND",
            RejectReason::BookAlreadyExists => "BOOK_ALREADY_EXISTS",
            RejectReason::MemberAlreadyExists => "MEMBER_ALREADY_EXISTS",
            RejectReason::InvalidRequest => "INVALID_REQUEST",
            RejectReason::BorrowLimit => "BORROW_LIMIT",
            RejectReason::AlreadyBorrowed => "ALREADY_BORROWED",
            RejectReason::BookUnavailable => "BOOK_UNAVAILABLE",
            RejectReason::Reserved => "RESERVED",
            RejectReason::AlreadyReserved => "ALREADY_RESERVED",
            RejectReason::NotReserved => "NOT_RESERVED",
            RejectReason::InvalidExtension => "INVALID_EXTENSION",
            RejectReason::NotLoaned => "NOT_LOANED",
            RejectReason::NotBorrower => "NOT_BORROWER",
            RejectReason::ReservationExists => "RESERVATION_EXISTS",
            RejectReason::MaxExtensionReached => "MAX_EXTENSION_REACHED",
            RejectReason::BookLoaned => "BOOK_LOANED",
            RejectReason::BookReserved => "BOOK_RESERVED",
            RejectReason::MemberHasLoans => "MEMBER_HAS_LOANS",
        }
    }

    /// リソース不在による拒否か（HTTP層で404にマッピングされる）
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RejectReason::BookNotFound | RejectReason::MemberNotFound
        )
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_matches_wire_codes() {
        assert_eq!(RejectReason::BorrowLimit.as_str(), "BORROW_LIMIT");
        assert_eq!(
            RejectReason::MaxExtensionReached.as_str(),
            "MAX_EXTENSION_REACHED"
        );
        assert_eq!(RejectReason::BookLoaned.as_str(), "BOOK_LOANED");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(RejectReason::BookNotFound.is_not_found());
        assert!(RejectReason::MemberNotFound.is_not_found());
        assert!(!RejectReason::BookUnavailable.is_not_found());
        assert!(!RejectReason::InvalidRequest.is_not_found());
    }
}
