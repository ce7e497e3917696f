//! Initial post collection loaded at startup.

use std::path::Path;

use tracing::info;

use crate::domain::posts::Post;

use super::error::InfraError;

/// Posts compiled into the binary, used when no seed file is configured.
pub const DEFAULT_SEED: &str = include_str!("../../data/posts.json");

/// Read the seed collection from `path`, or fall back to [`DEFAULT_SEED`].
pub async fn load(path: Option<&Path>) -> Result<Vec<Post>, InfraError> {
    let Some(path) = path else {
        return parse(DEFAULT_SEED, "built-in seed");
    };

    let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
        InfraError::seed(format!("failed to read `{}`: {err}", path.display()))
    })?;
    let posts = parse(&raw, &path.display().to_string())?;

    info!(
        target = "scribe::seed",
        path = %path.display(),
        posts = posts.len(),
        "Loaded seed posts"
    );
    Ok(posts)
}

pub fn parse(raw: &str, origin: &str) -> Result<Vec<Post>, InfraError> {
    serde_json::from_str(raw)
        .map_err(|err| InfraError::seed(format!("failed to parse {origin}: {err}")))
}
