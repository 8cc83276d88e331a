use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::book::{ActiveLoan, Book, LoanState, ReservationQueue};
use crate::domain::value_objects::{BookId, MemberId};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};

const BOOK_COLUMNS: &str = "id, title, loaned_to, due_date, first_due_date, reservation_queue";

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// PostgreSQLの行データをBookに変換する
///
/// 貸出3フィールド（loaned_to, due_date, first_due_date）は揃って存在するか
/// 揃って存在しないかのどちらか。片方だけの行は不変条件違反として
/// InvalidDataエラーにする。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let id: String = row.get("id");
    let loaned_to: Option<String> = row.get("loaned_to");
    let due_date: Option<NaiveDate> = row.get("due_date");
    let first_due_date: Option<NaiveDate> = row.get("first_due_date");

    let loan = match (loaned_to, due_date, first_due_date) {
        (None, None, None) => LoanState::Free,
        (Some(borrower), Some(due_date), Some(first_due_date)) => LoanState::Loaned(ActiveLoan {
            borrower: MemberId::new(borrower),
            due_date,
            first_due_date,
        }),
        _ => {
            return Err(invalid_data(format!(
                "book {}: loan fields are partially set",
                id
            )));
        }
    };

    let queue_json: serde_json::Value = row.get("reservation_queue");
    let members: Vec<String> = serde_json::from_value(queue_json)
        .map_err(|e| invalid_data(format!("book {}: invalid reservation_queue: {}", id, e)))?;

    Ok(Book {
        id: BookId::new(id),
        title: row.get("title"),
        loan,
        queue: ReservationQueue::from_members(members.into_iter().map(MemberId::new).collect()),
    })
}

/// LIKE/ILIKEのメタ文字をエスケープし、断片をリテラルとして照合させる
///
/// エスケープしないと`%`と`_`がワイルドカードとして働き、インメモリ実装の
/// 部分文字列照合と挙動がずれる。PostgreSQLの既定のエスケープ文字は
/// バックスラッシュ。
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn queue_to_json(queue: &ReservationQueue) -> serde_json::Value {
    serde_json::Value::Array(
        queue
            .iter()
            .map(|m| serde_json::Value::String(m.as_str().to_string()))
            .collect(),
    )
}

/// BookRepositoryのPostgreSQL実装
///
/// 予約キューはJSONB配列としてFIFO順のまま保存される。
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn find_by_id(&self, book_id: &BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn exists_by_id(&self, book_id: &BookId) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<bool, _>(0))
    }

    /// 書籍の現在状態を保存（upsert）
    ///
    /// INSERT ... ON CONFLICT UPDATEを使用し、常にエンティティの完全な状態を
    /// 書き戻す。部分更新は行わない。
    async fn save(&self, book: Book) -> Result<()> {
        let loan = book.loan.as_loan();
        sqlx::query(
            r#"
            INSERT INTO books (id, title, loaned_to, due_date, first_due_date, reservation_queue)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                title = EXCLUDED.title,
                loaned_to = EXCLUDED.loaned_to,
                due_date = EXCLUDED.due_date,
                first_due_date = EXCLUDED.first_due_date,
                reservation_queue = EXCLUDED.reservation_queue
            "#,
        )
        .bind(book.id.as_str())
        .bind(&book.title)
        .bind(loan.map(|l| l.borrower.as_str().to_string()))
        .bind(loan.map(|l| l.due_date))
        .bind(loan.map(|l| l.first_due_date))
        .bind(queue_to_json(&book.queue))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, book_id: &BookId) -> Result<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!("SELECT {} FROM books ORDER BY id", BOOK_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_row_to_book).collect()
    }

    async fn count_by_loaned_to(&self, member_id: &MemberId) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) FROM books WHERE loaned_to = $1")
            .bind(member_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>(0) as usize)
    }

    async fn find_by_loaned_to(&self, member_id: &MemberId) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE loaned_to = $1 ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(member_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_row_to_book).collect()
    }

    async fn find_by_due_date_before(&self, date: NaiveDate) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE due_date < $1 ORDER BY due_date ASC",
            BOOK_COLUMNS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_row_to_book).collect()
    }

    async fn find_by_reservation_queue_containing(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Book>> {
        // JSONB配列の包含判定（GINインデックスが使われる）
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE reservation_queue @> jsonb_build_array($1::text) ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(member_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_row_to_book).collect()
    }

    async fn find_by_loaned_to_is_null(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE loaned_to IS NULL ORDER BY id",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_row_to_book).collect()
    }

    async fn exists_by_loaned_to(&self, member_id: &MemberId) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM books WHERE loaned_to = $1)")
            .bind(member_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<bool, _>(0))
    }

    async fn find_by_title_containing_ignore_case(&self, fragment: &str) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE title ILIKE '%' || $1 || '%' ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(escape_like(fragment))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_row_to_book).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100% Rust"), "100\\% Rust");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        // メタ文字を含まない断片はそのまま
        assert_eq!(escape_like("Refactoring"), "Refactoring");
    }
}
