use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::posts::PostId;

pub const TITLE_TYPE_MESSAGE: &str = "Title must be a string.";
pub const CONTENT_TYPE_MESSAGE: &str = "Content must be a string.";

/// Body of `POST /api/posts`. Unknown keys are carried into the stored post.
///
/// Only JSON objects are accepted. Each known field is `None` when the key is
/// absent and `Some(None)` when it is present as `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PostCreateRequest {
    pub title: Option<Option<String>>,
    pub content: Option<Option<String>>,
    pub extra: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for PostCreateRequest {
    type Error = serde_json::Error;

    fn try_from(mut body: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            title: take_field(&mut body, "title")?,
            content: take_field(&mut body, "content")?,
            extra: body,
        })
    }
}

/// Body of `PUT /api/posts/{id}`; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PostUpdateRequest {
    pub title: Option<Option<String>>,
    pub content: Option<Option<String>>,
}

impl TryFrom<Map<String, Value>> for PostUpdateRequest {
    type Error = serde_json::Error;

    fn try_from(mut body: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            title: take_field(&mut body, "title")?,
            content: take_field(&mut body, "content")?,
        })
    }
}

fn take_field(
    body: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<Option<String>>, serde_json::Error> {
    body.remove(key)
        .map(Option::<String>::deserialize)
        .transpose()
}

/// Query of `GET /api/posts`. Repeated keys resolve to their first value.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct PostListQuery {
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl From<Vec<(String, String)>> for PostListQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            sort: first_value(&pairs, "sort"),
            direction: first_value(&pairs, "direction"),
        }
    }
}

/// Query of `GET /api/posts/search`. Repeated keys resolve to their first value.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct PostSearchQuery {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<Vec<(String, String)>> for PostSearchQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            title: first_value(&pairs, "title"),
            content: first_value(&pairs, "content"),
        }
    }
}

fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.clone())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDeletedResponse {
    pub message: String,
}

impl PostDeletedResponse {
    pub fn for_id(id: PostId) -> Self {
        Self {
            message: format!("Post with id {id} has been deleted successfully."),
        }
    }
}
