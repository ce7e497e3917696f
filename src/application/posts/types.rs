use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    application::repos::RepoError,
    domain::{error::DomainError, posts::PostId},
};

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Raw create input; presence of `title` and `content` is checked by the service.
#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub title: Option<String>,
    pub content: Option<String>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: PostId,
    pub title: Option<String>,
    pub content: Option<String>,
}
