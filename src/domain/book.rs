use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::errors::RejectReason;
use super::value_objects::{BookId, MemberId};

/// 会員1人あたりの最大貸出冊数
pub const MAX_LOANS: usize = 5;

/// 貸出期間（日数）
pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// 初回返却期限から数えた延長の上限（日数）
pub const MAX_EXTENSION_DAYS: i64 = 90;

/// 貸出中の状態
///
/// 借り手・返却期限・初回返却期限は常に揃って存在する。
/// `first_due_date`は貸出開始時の期限で、以降のすべての延長の上限を決める。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLoan {
    pub borrower: MemberId,
    pub due_date: NaiveDate,
    pub first_due_date: NaiveDate,
}

impl ActiveLoan {
    /// 貸出を開始する
    ///
    /// ビジネスルール：
    /// - 返却期限は貸出日 + 14日
    /// - 初回返却期限 = 返却期限
    pub fn start(borrower: MemberId, today: NaiveDate) -> Self {
        let due_date = today + Duration::days(DEFAULT_LOAN_DAYS);
        Self {
            borrower,
            due_date,
            first_due_date: due_date,
        }
    }
}

/// 書籍の貸出状態
///
/// 「借り手・返却期限・初回返却期限はすべて揃って存在する」という不変条件を
/// 直和型で表現し、不正な組み合わせを型システムで排除する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanState {
    /// 貸出可能
    Free,
    /// 貸出中
    Loaned(ActiveLoan),
}

impl LoanState {
    pub fn is_free(&self) -> bool {
        matches!(self, LoanState::Free)
    }

    /// 借り手のID（貸出中でなければNone）
    pub fn borrower(&self) -> Option<&MemberId> {
        match self {
            LoanState::Free => None,
            LoanState::Loaned(loan) => Some(&loan.borrower),
        }
    }

    pub fn as_loan(&self) -> Option<&ActiveLoan> {
        match self {
            LoanState::Free => None,
            LoanState::Loaned(loan) => Some(loan),
        }
    }
}

/// 予約キュー
///
/// 不変条件：
/// - FIFO順（挿入順が意味を持つ）
/// - 同じ会員IDは高々1つ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationQueue(Vec<MemberId>);

impl ReservationQueue {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_members(members: Vec<MemberId>) -> Self {
        let mut queue = Self::new();
        for member in members {
            queue.push_back(member);
        }
        queue
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn head(&self) -> Option<&MemberId> {
        self.0.first()
    }

    pub fn contains(&self, member_id: &MemberId) -> bool {
        self.0.contains(member_id)
    }

    /// 会員の0始まりの待ち位置
    pub fn position(&self, member_id: &MemberId) -> Option<usize> {
        self.0.iter().position(|m| m == member_id)
    }

    /// 末尾に追加する。既に並んでいる場合は何もせずfalseを返す。
    pub fn push_back(&mut self, member_id: MemberId) -> bool {
        if self.contains(&member_id) {
            return false;
        }
        self.0.push(member_id);
        true
    }

    pub fn pop_head(&mut self) -> Option<MemberId> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.remove(0))
        }
    }

    /// 任意位置の会員を取り除く。並んでいなければfalse。
    pub fn remove(&mut self, member_id: &MemberId) -> bool {
        match self.position(member_id) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[MemberId] {
        &self.0
    }
}

/// 書籍エンティティ
///
/// 貸出状態と予約キューを持つ。貸出（Loan）は独立したエンティティではなく
/// 書籍への射影として存在する：貸出で生まれ、返却で消える。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub loan: LoanState,
    pub queue: ReservationQueue,
}

impl Book {
    pub fn new(id: BookId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            loan: LoanState::Free,
            queue: ReservationQueue::new(),
        }
    }

    pub fn is_loaned(&self) -> bool {
        !self.loan.is_free()
    }

    pub fn is_loaned_to(&self, member_id: &MemberId) -> bool {
        self.loan.borrower() == Some(member_id)
    }

    /// 貸出を開始する
    ///
    /// 借り手が予約キューに並んでいた場合は取り除く（借り手はキューに
    /// 現れないという不変条件の維持）。
    pub fn start_loan(&mut self, borrower: MemberId, today: NaiveDate) {
        self.queue.remove(&borrower);
        self.loan = LoanState::Loaned(ActiveLoan::start(borrower, today));
    }

    /// 貸出を終了して書籍を空きに戻す。直前の貸出を返す。
    pub fn end_loan(&mut self) -> Option<ActiveLoan> {
        match std::mem::replace(&mut self.loan, LoanState::Free) {
            LoanState::Free => None,
            LoanState::Loaned(loan) => Some(loan),
        }
    }

    /// 返却期限を延長する
    ///
    /// ビジネスルール：
    /// - 初回返却期限から90日を超える延長は不可
    /// - 負の日数（短縮）は、初回返却期限を下回らない範囲で許容される
    pub fn extend_due(&mut self, days: i64) -> Result<(), RejectReason> {
        let loan = match &mut self.loan {
            LoanState::Free => return Err(RejectReason::NotLoaned),
            LoanState::Loaned(loan) => loan,
        };

        let new_due = loan.due_date + Duration::days(days);
        let offset = (new_due - loan.first_due_date).num_days();
        if offset < 0 || offset > MAX_EXTENSION_DAYS {
            return Err(RejectReason::MaxExtensionReached);
        }

        loan.due_date = new_due;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ReservationQueue のテスト

    #[test]
    fn test_queue_preserves_fifo_order() {
        let mut queue = ReservationQueue::new();
        assert!(queue.push_back(MemberId::new("m1")));
        assert!(queue.push_back(MemberId::new("m2")));
        assert!(queue.push_back(MemberId::new("m3")));

        assert_eq!(queue.pop_head(), Some(MemberId::new("m1")));
        assert_eq!(queue.pop_head(), Some(MemberId::new("m2")));
        assert_eq!(queue.pop_head(), Some(MemberId::new("m3")));
        assert_eq!(queue.pop_head(), None);
    }

    #[test]
    fn test_queue_rejects_duplicates() {
        let mut queue = ReservationQueue::new();
        assert!(queue.push_back(MemberId::new("m1")));
        assert!(!queue.push_back(MemberId::new("m1")));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_remove_keeps_relative_order() {
        let mut queue = ReservationQueue::from_members(vec![
            MemberId::new("m1"),
            MemberId::new("m2"),
            MemberId::new("m3"),
        ]);

        assert!(queue.remove(&MemberId::new("m2")));
        assert!(!queue.remove(&MemberId::new("m2")));
        assert_eq!(
            queue.as_slice(),
            &[MemberId::new("m1"), MemberId::new("m3")]
        );
    }

    #[test]
    fn test_queue_position_is_zero_based() {
        let queue =
            ReservationQueue::from_members(vec![MemberId::new("m1"), MemberId::new("m2")]);
        assert_eq!(queue.position(&MemberId::new("m1")), Some(0));
        assert_eq!(queue.position(&MemberId::new("m2")), Some(1));
        assert_eq!(queue.position(&MemberId::new("m9")), None);
    }

    // 貸出状態のテスト

    #[test]
    fn test_start_loan_sets_both_due_dates() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        let today = date(2025, 1, 1);

        book.start_loan(MemberId::new("m1"), today);

        let loan = book.loan.as_loan().unwrap();
        assert_eq!(loan.borrower, MemberId::new("m1"));
        assert_eq!(loan.due_date, date(2025, 1, 15));
        assert_eq!(loan.first_due_date, date(2025, 1, 15));
    }

    #[test]
    fn test_start_loan_removes_borrower_from_queue() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        book.queue.push_back(MemberId::new("m1"));
        book.queue.push_back(MemberId::new("m2"));

        book.start_loan(MemberId::new("m1"), date(2025, 1, 1));

        assert!(!book.queue.contains(&MemberId::new("m1")));
        assert_eq!(book.queue.as_slice(), &[MemberId::new("m2")]);
    }

    #[test]
    fn test_end_loan_returns_book_to_free() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        book.start_loan(MemberId::new("m1"), date(2025, 1, 1));

        let ended = book.end_loan().unwrap();
        assert_eq!(ended.borrower, MemberId::new("m1"));
        assert!(book.loan.is_free());

        // 空きの書籍の返却は何も返さない
        assert!(book.end_loan().is_none());
    }

    // 延長のテスト

    #[test]
    fn test_extend_due_within_window() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        book.start_loan(MemberId::new("m1"), date(2025, 1, 1));

        assert!(book.extend_due(14).is_ok());
        assert_eq!(book.loan.as_loan().unwrap().due_date, date(2025, 1, 29));
        // first_due_dateは変わらない
        assert_eq!(
            book.loan.as_loan().unwrap().first_due_date,
            date(2025, 1, 15)
        );
    }

    #[test]
    fn test_extend_due_rejects_past_ninety_days() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        book.loan = LoanState::Loaned(ActiveLoan {
            borrower: MemberId::new("m1"),
            due_date: date(2025, 3, 20),
            first_due_date: date(2025, 1, 1),
        });

        // 78日 + 13日 = 91日 > 90日
        assert_eq!(book.extend_due(13), Err(RejectReason::MaxExtensionReached));
        // 拒否された延長は状態を変えない
        assert_eq!(book.loan.as_loan().unwrap().due_date, date(2025, 3, 20));

        // ちょうど90日は許容される
        assert!(book.extend_due(12).is_ok());
        assert_eq!(book.loan.as_loan().unwrap().due_date, date(2025, 4, 1));
    }

    #[test]
    fn test_extend_due_accepts_negative_days_within_window() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        book.start_loan(MemberId::new("m1"), date(2025, 1, 1));

        // 一度延長してから短縮する。初回返却期限（1/15）以上なら許容される
        assert!(book.extend_due(14).is_ok());
        assert!(book.extend_due(-7).is_ok());
        assert_eq!(book.loan.as_loan().unwrap().due_date, date(2025, 1, 22));

        // ちょうど初回返却期限まで戻すのは許容される
        assert!(book.extend_due(-7).is_ok());
        assert_eq!(book.loan.as_loan().unwrap().due_date, date(2025, 1, 15));
    }

    #[test]
    fn test_extend_due_rejects_shortening_below_first_due_date() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        book.start_loan(MemberId::new("m1"), date(2025, 1, 1));

        // 貸出直後は期限 = 初回返却期限なので、短縮は必ず下限を割る
        assert_eq!(book.extend_due(-20), Err(RejectReason::MaxExtensionReached));
        assert_eq!(book.extend_due(-1), Err(RejectReason::MaxExtensionReached));
        // 拒否された延長は状態を変えない
        assert_eq!(book.loan.as_loan().unwrap().due_date, date(2025, 1, 15));
        assert_eq!(
            book.loan.as_loan().unwrap().first_due_date,
            date(2025, 1, 15)
        );
    }

    #[test]
    fn test_extend_due_on_free_book_is_rejected() {
        let mut book = Book::new(BookId::new("b1"), "Refactoring");
        assert_eq!(book.extend_due(7), Err(RejectReason::NotLoaned));
    }
}
