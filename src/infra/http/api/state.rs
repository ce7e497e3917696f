use std::sync::Arc;

use crate::application::posts::PostService;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
}

impl ApiState {
    pub fn new(posts: Arc<PostService>) -> Self {
        Self { posts }
    }
}
