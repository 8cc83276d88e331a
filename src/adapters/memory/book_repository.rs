use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::book::Book;
use crate::domain::value_objects::{BookId, MemberId};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};

/// In-memory implementation of BookRepository
///
/// Backed by a Mutex-guarded HashMap. Entities are cloned on the way in and
/// out, so callers never share a live instance with the store.
/// Used by the integration tests and for running without a database.
pub struct BookRepository {
    books: Mutex<HashMap<BookId, Book>>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for BookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn find_by_id(&self, book_id: &BookId) -> Result<Option<Book>> {
        Ok(self.books.lock().unwrap().get(book_id).cloned())
    }

    async fn exists_by_id(&self, book_id: &BookId) -> Result<bool> {
        Ok(self.books.lock().unwrap().contains_key(book_id))
    }

    async fn save(&self, book: Book) -> Result<()> {
        self.books.lock().unwrap().insert(book.id.clone(), book);
        Ok(())
    }

    async fn delete(&self, book_id: &BookId) -> Result<()> {
        self.books.lock().unwrap().remove(book_id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.books.lock().unwrap().values().cloned().collect();
        // Deterministic order for callers and tests
        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }

    async fn count_by_loaned_to(&self, member_id: &MemberId) -> Result<usize> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.is_loaned_to(member_id))
            .count())
    }

    async fn find_by_loaned_to(&self, member_id: &MemberId) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.is_loaned_to(member_id))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }

    async fn find_by_due_date_before(&self, date: NaiveDate) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.loan.as_loan().is_some_and(|loan| loan.due_date < date))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }

    async fn find_by_reservation_queue_containing(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.queue.contains(member_id))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }

    async fn find_by_loaned_to_is_null(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.loan.is_free())
            .cloned()
            .collect();
        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }

    async fn exists_by_loaned_to(&self, member_id: &MemberId) -> Result<bool> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .values()
            .any(|b| b.is_loaned_to(member_id)))
    }

    async fn find_by_title_containing_ignore_case(&self, fragment: &str) -> Result<Vec<Book>> {
        let needle = fragment.to_lowercase();
        let mut books: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }
}
