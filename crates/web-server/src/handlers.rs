use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{NewPost, NewThread, NewUser, Post, Thread, User};

use crate::error::AppError;
use crate::AppState;

/// Identifiers are positive integers; anything else is a client error before
/// we ever touch the store.
fn valid_id(id: i32) -> Result<i32, AppError> {
    if id < 1 {
        return Err(AppError::Validation(format!(
            "id must be a positive integer, got {id}"
        )));
    }
    Ok(id)
}

/// Writes are gated until bootstrap has completed; an unestablished table must
/// never see an insert.
fn ensure_ready(state: &AppState) -> Result<(), AppError> {
    if state.is_ready() {
        Ok(())
    } else {
        Err(AppError::Unavailable)
    }
}

/// # GET /
pub async fn root(State(state): State<Arc<AppState>>) -> String {
    format!("{} service OK", state.service)
}

/// # GET /api/
pub async fn api_root() -> &'static str {
    "API ready to receive requests"
}

// ==============================================================================
// users
// ==============================================================================

/// # GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.repo.list_users().await?;
    Ok(Json(users))
}

/// # GET /users/:id
/// A miss is an empty result with success status, not a fault.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Option<User>>, AppError> {
    let user = state.repo.get_user(valid_id(id)?).await?;
    Ok(Json(user))
}

/// # POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    ensure_ready(&state)?;
    let user = state.repo.insert_user(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ==============================================================================
// threads
// ==============================================================================

/// # GET /threads
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Thread>>, AppError> {
    let threads = state.repo.list_threads().await?;
    Ok(Json(threads))
}

/// # GET /threads/:id
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Option<Thread>>, AppError> {
    let thread = state.repo.get_thread(valid_id(id)?).await?;
    Ok(Json(thread))
}

/// # POST /threads
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewThread>,
) -> Result<(StatusCode, Json<Thread>), AppError> {
    ensure_ready(&state)?;
    let thread = state.repo.insert_thread(new).await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

// ==============================================================================
// posts
// ==============================================================================

/// # GET /posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.repo.list_posts().await?;
    Ok(Json(posts))
}

/// # GET /posts/:id
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Option<Post>>, AppError> {
    let post = state.repo.get_post(valid_id(id)?).await?;
    Ok(Json(post))
}

/// # GET /posts/in-thread/:thread_id
pub async fn posts_in_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<i32>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.repo.posts_in_thread(valid_id(thread_id)?).await?;
    Ok(Json(posts))
}

/// # GET /posts/by-user/:user_id
pub async fn posts_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.repo.posts_by_user(valid_id(user_id)?).await?;
    Ok(Json(posts))
}

/// # POST /posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    ensure_ready(&state)?;
    let post = state.repo.insert_post(new).await?;
    Ok((StatusCode::CREATED, Json(post)))
}
