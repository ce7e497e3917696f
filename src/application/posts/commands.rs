use metrics::counter;
use tracing::info;

use crate::domain::posts::{NewPost, Post, PostId, PostPatch};

use super::service::PostService;
use super::types::{CreatePostCommand, PostServiceError, UpdatePostCommand};

impl PostService {
    pub async fn create_post(&self, command: CreatePostCommand) -> Result<Post, PostServiceError> {
        let new_post = NewPost::new(command.title, command.content, command.extra)?;
        let post = self.writer.create_post(new_post).await?;

        counter!("scribe_posts_created_total").increment(1);
        info!(target = "scribe::posts", post_id = post.id, "post created");
        Ok(post)
    }

    pub async fn update_post(&self, command: UpdatePostCommand) -> Result<Post, PostServiceError> {
        let patch = PostPatch {
            title: command.title,
            content: command.content,
        };
        let post = self.writer.update_post(command.id, patch).await?;

        counter!("scribe_posts_updated_total").increment(1);
        info!(target = "scribe::posts", post_id = post.id, "post updated");
        Ok(post)
    }

    pub async fn delete_post(&self, id: PostId) -> Result<(), PostServiceError> {
        self.writer.delete_post(id).await?;

        counter!("scribe_posts_deleted_total").increment(1);
        info!(target = "scribe::posts", post_id = id, "post deleted");
        Ok(())
    }
}
