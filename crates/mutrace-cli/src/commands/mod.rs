pub mod diff;
pub mod replay;
pub mod tree;

use std::path::Path;

use mutrace_core::config::EngineConfig;
use mutrace_core::errors::MutraceError;
use mutrace_core::Post;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

pub fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Read a JSON array of posts
pub fn load_posts(path: &Path) -> CliResult<Vec<Post>> {
    let text = std::fs::read_to_string(path).map_err(|e| MutraceError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let posts = serde_json::from_str(&text).map_err(|e| MutraceError::Io {
        path: path.display().to_string(),
        reason: format!("invalid post list: {}", e),
    })?;
    Ok(posts)
}
