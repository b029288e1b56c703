//! JSON HTTP shell over a shared [`ReadingService`].
//!
//! The service itself is single-owner; requests take turns on a mutex.

mod handlers;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;

use crate::service::ReadingService;
use crate::store::KvStore;

pub struct AppState<S> {
    service: Arc<Mutex<ReadingService<S>>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: KvStore> AppState<S> {
    pub fn new(service: ReadingService<S>) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ReadingService<S>>, (StatusCode, String)> {
        self.service.lock().map_err(|_| {
            tracing::error!("reading service mutex poisoned");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "reading service unavailable".to_owned(),
            )
        })
    }
}

pub fn router<S>(state: AppState<S>) -> Router
where
    S: KvStore + Send + 'static,
{
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route(
            "/books/:book_id/progress",
            get(handlers::get_progress::<S>).put(handlers::set_page::<S>),
        )
        .route("/books/:book_id/bookmarks", get(handlers::get_bookmarks::<S>))
        .route(
            "/books/:book_id/bookmarks/toggle",
            post(handlers::toggle_bookmark::<S>),
        )
        .route(
            "/books/:book_id/stats",
            get(handlers::get_stats::<S>).post(handlers::update_stats::<S>),
        )
        .route("/books/:book_id", delete(handlers::clear_book::<S>))
        .route("/favorites", get(handlers::get_favorites::<S>))
        .route(
            "/favorites/:book_id/toggle",
            post(handlers::toggle_favorite::<S>),
        )
        .route("/purchases", get(handlers::get_purchases::<S>))
        .route("/purchases/:book_id", put(handlers::mark_purchased::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
