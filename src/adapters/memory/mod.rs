pub mod book_repository;
pub mod member_repository;

pub use book_repository::BookRepository as InMemoryBookRepository;
pub use member_repository::MemberRepository as InMemoryMemberRepository;
