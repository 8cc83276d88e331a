pub mod book_management;
pub mod errors;
pub mod facade;
pub mod loan_engine;
pub mod locks;
pub mod member_management;
pub mod query_service;

pub use errors::{Result, ServiceError};
pub use facade::LibraryFacade;

use std::sync::Arc;

use crate::ports::{BookRepository, MemberRepository};
use locks::LockRegistry;

/// サービスの依存関係
///
/// 振る舞いを持たないデータ構造として定義し、各操作は
/// `&ServiceDependencies`を受け取る自由関数として実装する。
/// すべての依存が明示的になり、テストでの差し替えが容易になる。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repo: Arc<dyn BookRepository>,
    pub member_repo: Arc<dyn MemberRepository>,
    pub book_locks: Arc<LockRegistry>,
    pub member_locks: Arc<LockRegistry>,
}

impl ServiceDependencies {
    pub fn new(book_repo: Arc<dyn BookRepository>, member_repo: Arc<dyn MemberRepository>) -> Self {
        Self {
            book_repo,
            member_repo,
            book_locks: Arc::new(LockRegistry::new()),
            member_locks: Arc::new(LockRegistry::new()),
        }
    }
}
