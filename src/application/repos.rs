//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::{NewPost, Post, PostId, PostPatch, PostSearch};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("resource not found")]
    NotFound,
    #[error("integrity error: {message}")]
    Integrity { message: String },
}

impl RepoError {
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Snapshot of the collection in stored order.
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError>;

    /// Matching posts in stored order.
    async fn search_posts(&self, search: &PostSearch) -> Result<Vec<Post>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn update_post(&self, id: PostId, patch: PostPatch) -> Result<Post, RepoError>;

    async fn delete_post(&self, id: PostId) -> Result<(), RepoError>;
}
