use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::value_objects::{BookId, MemberId};

/// コマンド：書籍を借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub today: NaiveDate,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub today: NaiveDate,
}

/// コマンド：書籍を予約する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveBook {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub today: NaiveDate,
}

/// コマンド：予約を取り消す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReservation {
    pub book_id: BookId,
    pub member_id: MemberId,
}

/// コマンド：貸出を延長する
///
/// `days`は負でもよい（短縮）。0は不正。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendLoan {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub days: i64,
}
