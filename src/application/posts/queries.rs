use metrics::counter;

use crate::domain::posts::{Post, PostOrder, PostSearch};

use super::service::PostService;
use super::types::PostServiceError;

impl PostService {
    /// List every post, sorted when `sort` names a sortable field.
    pub async fn list_posts(
        &self,
        sort: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Vec<Post>, PostServiceError> {
        let order = PostOrder::from_query(sort, direction)?;
        let mut posts = self.reader.list_posts().await?;
        if let Some(order) = order {
            order.sort(&mut posts);
        }
        Ok(posts)
    }

    pub async fn search_posts(
        &self,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Vec<Post>, PostServiceError> {
        counter!("scribe_posts_search_total").increment(1);

        let search = PostSearch::new(title, content);
        if search.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.reader.search_posts(&search).await?)
    }
}
