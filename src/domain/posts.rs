use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DomainError;

pub const MISSING_FIELDS_MESSAGE: &str = "Title and content are required.";
pub const INVALID_DIRECTION_MESSAGE: &str = "Direction must be 'asc' or 'desc'";

pub type PostId = u64;

/// A stored blog post. Keys supplied at creation beyond `title` and `content`
/// are kept in `extra` and serialized back alongside the known fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated post waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub extra: Map<String, Value>,
}

impl NewPost {
    /// Both fields must be present; empty strings are accepted.
    pub fn new(
        title: Option<String>,
        content: Option<String>,
        mut extra: Map<String, Value>,
    ) -> Result<Self, DomainError> {
        let (Some(title), Some(content)) = (title, content) else {
            return Err(DomainError::validation(MISSING_FIELDS_MESSAGE));
        };

        // The id is always assigned by the store.
        extra.remove("id");

        Ok(Self {
            title,
            content,
            extra,
        })
    }

    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            extra: self.extra,
        }
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Content,
}

impl SortField {
    /// Unknown field names yield `None` and leave the listing unsorted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "content" => Some(Self::Content),
            _ => None,
        }
    }

    fn key<'a>(&self, post: &'a Post) -> &'a str {
        match self {
            Self::Title => &post.title,
            Self::Content => &post.content,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(DomainError::validation(INVALID_DIRECTION_MESSAGE)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl PostOrder {
    /// Resolve the `sort`/`direction` query pair.
    ///
    /// The direction is only validated when `sort` names a sortable field;
    /// otherwise both parameters are ignored and `Ok(None)` is returned.
    pub fn from_query(
        sort: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Option<Self>, DomainError> {
        let Some(field) = sort.and_then(SortField::parse) else {
            return Ok(None);
        };
        let direction = match direction {
            Some(value) => value.parse()?,
            None => SortDirection::default(),
        };
        Ok(Some(Self { field, direction }))
    }

    fn compare(&self, left: &Post, right: &Post) -> Ordering {
        let ordering = self.field.key(left).cmp(self.field.key(right));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Stable in both directions: equal keys keep their collection order.
    pub fn sort(&self, posts: &mut [Post]) {
        posts.sort_by(|left, right| self.compare(left, right));
    }
}

/// Case-insensitive substring search over titles and contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSearch {
    title: String,
    content: String,
}

impl PostSearch {
    pub fn new(title: Option<&str>, content: Option<&str>) -> Self {
        Self {
            title: title.unwrap_or_default().to_lowercase(),
            content: content.unwrap_or_default().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }

    /// Empty terms never match.
    pub fn matches(&self, post: &Post) -> bool {
        let title_hit =
            !self.title.is_empty() && post.title.to_lowercase().contains(self.title.as_str());
        let content_hit = !self.content.is_empty()
            && post.content.to_lowercase().contains(self.content.as_str());
        title_hit || content_hit
    }
}

/// How the store picks the id of a newly created post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Collection length plus one. Ids repeat after a delete followed by a create.
    #[default]
    Length,
    /// A counter that only moves forward, so ids are never handed out twice.
    Monotonic,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Monotonic => "monotonic",
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "length" => Ok(Self::Length),
            "monotonic" => Ok(Self::Monotonic),
            other => Err(format!(
                "unknown id strategy `{other}` (expected `length` or `monotonic`)"
            )),
        }
    }
}
