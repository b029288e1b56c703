use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::bookmarks::{BookmarkKey, BookmarkSet};
use crate::model::BookId;
use crate::progress::ReadingProgress;
use crate::stats::{ReadingStats, StatsUpdate};
use crate::store::KvStore;

type HandlerResult<T> = Result<T, (StatusCode, String)>;

#[derive(Debug, Deserialize)]
pub(super) struct PositionBody {
    chapter: usize,
    page: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct BookmarkToggled {
    bookmarked: bool,
    bookmarks: BookmarkSet,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteToggled {
    favorite: bool,
}

pub(super) async fn get_progress<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
) -> HandlerResult<Json<ReadingProgress>> {
    let progress = state.lock()?.get_progress(&BookId::from(book_id));
    Ok(Json(progress))
}

pub(super) async fn set_page<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
    Json(body): Json<PositionBody>,
) -> HandlerResult<Json<ReadingProgress>> {
    let progress = state
        .lock()?
        .set_page(&BookId::from(book_id), body.chapter, body.page);
    Ok(Json(progress))
}

pub(super) async fn get_bookmarks<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
) -> HandlerResult<Json<BookmarkSet>> {
    let bookmarks = state.lock()?.get_bookmarks(&BookId::from(book_id));
    Ok(Json(bookmarks))
}

pub(super) async fn toggle_bookmark<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
    Json(body): Json<PositionBody>,
) -> HandlerResult<Json<BookmarkToggled>> {
    let book_id = BookId::from(book_id);
    let bookmarks = state
        .lock()?
        .toggle_bookmark(&book_id, body.chapter, body.page);
    let bookmarked = bookmarks.contains(BookmarkKey::new(body.chapter, body.page));
    Ok(Json(BookmarkToggled {
        bookmarked,
        bookmarks,
    }))
}

pub(super) async fn get_stats<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
) -> HandlerResult<Json<ReadingStats>> {
    let stats = state.lock()?.get_stats(&BookId::from(book_id));
    Ok(Json(stats))
}

pub(super) async fn update_stats<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
    Json(update): Json<StatsUpdate>,
) -> HandlerResult<Json<ReadingStats>> {
    let stats = state
        .lock()?
        .update_stats(&BookId::from(book_id), &update);
    Ok(Json(stats))
}

pub(super) async fn clear_book<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
) -> HandlerResult<StatusCode> {
    state.lock()?.clear_book_data(&BookId::from(book_id));
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn get_favorites<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
) -> HandlerResult<Json<Vec<BookId>>> {
    let favorites = state.lock()?.get_favorites();
    Ok(Json(favorites))
}

pub(super) async fn toggle_favorite<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
) -> HandlerResult<Json<FavoriteToggled>> {
    let favorite = state.lock()?.toggle_favorite(&BookId::from(book_id));
    Ok(Json(FavoriteToggled { favorite }))
}

pub(super) async fn get_purchases<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
) -> HandlerResult<Json<BTreeMap<BookId, bool>>> {
    let purchases = state.lock()?.get_purchases();
    Ok(Json(purchases))
}

pub(super) async fn mark_purchased<S: KvStore + Send + 'static>(
    State(state): State<AppState<S>>,
    Path(book_id): Path<String>,
) -> HandlerResult<StatusCode> {
    let book_id = BookId::from(book_id);
    if !state.lock()?.mark_purchased(&book_id) {
        return Err((
            StatusCode::INSUFFICIENT_STORAGE,
            format!("could not persist purchase of {book_id}"),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
