use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow, cancel_reservation, create_book, create_member, delete_book, delete_member,
    extend, health_check, list_books, list_members, list_overdue_books, member_summary, reserve,
    return_book, update_book, update_member,
};

/// Creates the API router with all library endpoints
///
/// Management endpoints:
/// - GET/POST/PUT/DELETE /api/books
/// - GET/POST/PUT/DELETE /api/members
///
/// Loan lifecycle endpoints:
/// - POST /api/borrow, /api/return, /api/reserve,
///   /api/cancel-reservation, /api/extend
///
/// Query endpoints:
/// - GET /api/books/overdue
/// - GET /api/members/:id/summary
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/api/health", get(health_check))
        // Book and member management
        .route(
            "/api/books",
            get(list_books)
                .post(create_book)
                .put(update_book)
                .delete(delete_book),
        )
        .route(
            "/api/members",
            get(list_members)
                .post(create_member)
                .put(update_member)
                .delete(delete_member),
        )
        // Loan lifecycle
        .route("/api/borrow", post(borrow))
        .route("/api/return", post(return_book))
        .route("/api/reserve", post(reserve))
        .route("/api/cancel-reservation", post(cancel_reservation))
        .route("/api/extend", post(extend))
        // Queries
        .route("/api/books/overdue", get(list_overdue_books))
        .route("/api/members/:id/summary", get(member_summary))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}
