//! Process-wide post collection held in memory.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::repos::{PostsRepo, PostsWriteRepo, RepoError};
use crate::domain::posts::{IdStrategy, NewPost, Post, PostId, PostPatch, PostSearch};

/// Ordered post collection guarded by a single mutex.
///
/// Every operation holds the lock for its whole read-modify-write sequence,
/// so concurrent creates never observe the same collection length.
pub struct InMemoryPostStore {
    state: Mutex<StoreState>,
}

struct StoreState {
    posts: Vec<Post>,
    strategy: IdStrategy,
    /// `None` once the id space is used up.
    next_id: Option<PostId>,
}

impl StoreState {
    fn assign_id(&mut self) -> Result<PostId, RepoError> {
        match self.strategy {
            IdStrategy::Length => Ok(self.posts.len() as PostId + 1),
            IdStrategy::Monotonic => {
                let id = self
                    .next_id
                    .ok_or_else(|| RepoError::integrity("post id space exhausted"))?;
                self.next_id = id.checked_add(1);
                Ok(id)
            }
        }
    }
}

impl InMemoryPostStore {
    pub fn new(seed: Vec<Post>, strategy: IdStrategy) -> Result<Self, RepoError> {
        let mut seen = HashSet::with_capacity(seed.len());
        for post in &seed {
            if !seen.insert(post.id) {
                return Err(RepoError::integrity(format!(
                    "seed contains duplicate post id {}",
                    post.id
                )));
            }
        }

        let next_id = seed
            .iter()
            .map(|post| post.id)
            .max()
            .unwrap_or(0)
            .checked_add(1);
        Ok(Self {
            state: Mutex::new(StoreState {
                posts: seed,
                strategy,
                next_id,
            }),
        })
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.posts.len()
    }
}

#[async_trait]
impl PostsRepo for InMemoryPostStore {
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.state.lock().await.posts.clone())
    }

    async fn search_posts(&self, search: &PostSearch) -> Result<Vec<Post>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .iter()
            .filter(|post| search.matches(post))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryPostStore {
    async fn create_post(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut state = self.state.lock().await;
        let id = state.assign_id()?;
        let post = post.into_post(id);
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: PostId, patch: PostPatch) -> Result<Post, RepoError> {
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(RepoError::NotFound)?;
        patch.apply(post);
        Ok(post.clone())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        if !state.posts.iter().any(|post| post.id == id) {
            return Err(RepoError::NotFound);
        }
        // Removes every match; duplicates only arise under `IdStrategy::Length`.
        state.posts.retain(|post| post.id != id);
        Ok(())
    }
}
