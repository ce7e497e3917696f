//! Post handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::posts::{CreatePostCommand, PostServiceError, UpdatePostCommand};
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::domain::posts::PostId;

use super::error::{ApiError, NOT_FOUND_MESSAGE};
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::models::*;
use super::state::ApiState;

pub async fn list_posts(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .posts
        .list_posts(query.sort.as_deref(), query.direction.as_deref())
        .await
        .map_err(post_to_api)?;

    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreatePostCommand {
        title: non_null(payload.title, TITLE_TYPE_MESSAGE)?,
        content: non_null(payload.content, CONTENT_TYPE_MESSAGE)?,
        extra: payload.extra,
    };

    let post = state
        .posts
        .create_post(command)
        .await
        .map_err(post_to_api)?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<PostId>,
    ApiJson(payload): ApiJson<PostUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdatePostCommand {
        id,
        title: non_null(payload.title, TITLE_TYPE_MESSAGE)?,
        content: non_null(payload.content, CONTENT_TYPE_MESSAGE)?,
    };

    let post = state
        .posts
        .update_post(command)
        .await
        .map_err(post_to_api)?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<PostId>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete_post(id).await.map_err(post_to_api)?;

    Ok(Json(PostDeletedResponse::for_id(id)))
}

pub async fn search_posts(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<PostSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .posts
        .search_posts(query.title.as_deref(), query.content.as_deref())
        .await
        .map_err(post_to_api)?;

    Ok(Json(posts))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found.")
}

/// An absent field stays `None`; an explicit `null` is rejected.
fn non_null(
    field: Option<Option<String>>,
    message: &'static str,
) -> Result<Option<String>, ApiError> {
    match field {
        Some(None) => Err(ApiError::bad_request(message)),
        Some(Some(value)) => Ok(Some(value)),
        None => Ok(None),
    }
}

pub(crate) fn post_to_api(err: PostServiceError) -> ApiError {
    match err {
        PostServiceError::Domain(DomainError::Validation { message }) => {
            ApiError::bad_request(message)
        }
        PostServiceError::Repo(RepoError::NotFound) => ApiError::not_found(NOT_FOUND_MESSAGE),
        err @ PostServiceError::Repo(RepoError::Integrity { .. }) => ApiError::internal(&err),
    }
}
