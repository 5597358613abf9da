// SPDX-License-Identifier: AGPL-3.0
// Civet Core - Access token cache
//
// The real secure stores (keychain on native, cookie on web) live outside
// this crate. This provides the seam plus a plain JSON file cache for
// terminal use.

use crate::types::AppError;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Source of the bearer token attached to API requests.
///
/// Returning `None` means the request goes out unauthenticated and the
/// server decides what to reject.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed token, for tests and scripted use
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[derive(serde::Serialize, serde::Deserialize, Default)]
struct TokenFile {
    access_token: Option<String>,
}

/// File-backed token cache under the user config directory
pub struct FileTokenCache {
    cached: RwLock<Option<String>>,
    file_path: PathBuf,
}

impl FileTokenCache {
    /// Create a cache at the default config location, loading any stored
    /// token.
    pub fn new() -> Result<Self, AppError> {
        let config_dir = directories::ProjectDirs::from("com", "civet", "civet")
            .ok_or_else(|| AppError::FileIo("Could not determine config directory".to_string()))?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir)
            .map_err(|e| AppError::FileIo(format!("Failed to create config dir: {}", e)))?;

        Self::at_path(config_dir.join("token.json"))
    }

    /// Create a cache backed by an explicit file path
    pub fn at_path(file_path: PathBuf) -> Result<Self, AppError> {
        let cached = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| AppError::FileIo(format!("Failed to read token cache: {}", e)))?;

            let file: TokenFile = serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse token cache, starting fresh: {}", e);
                TokenFile::default()
            });

            file.access_token
        } else {
            None
        };

        Ok(Self {
            cached: RwLock::new(cached),
            file_path,
        })
    }

    fn persist(&self) -> Result<(), AppError> {
        let file = TokenFile {
            access_token: self.cached.read().unwrap().clone(),
        };

        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize token: {}", e)))?;

        fs::write(&self.file_path, content)
            .map_err(|e| AppError::FileIo(format!("Failed to write token cache: {}", e)))?;

        Ok(())
    }

    /// Store a new token and persist it
    pub fn set(&self, token: String) -> Result<(), AppError> {
        {
            let mut cached = self.cached.write().unwrap();
            *cached = Some(token);
        }
        self.persist()
    }

    /// Forget the stored token
    pub fn clear(&self) -> Result<(), AppError> {
        {
            let mut cached = self.cached.write().unwrap();
            *cached = None;
        }
        self.persist()
    }
}

impl TokenProvider for FileTokenCache {
    fn token(&self) -> Option<String> {
        self.cached.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let cache = FileTokenCache::at_path(path.clone()).unwrap();
        assert!(cache.token().is_none());
        cache.set("abc123".to_string()).unwrap();

        let reloaded = FileTokenCache::at_path(path).unwrap();
        assert_eq!(reloaded.token().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_clear_removes_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let cache = FileTokenCache::at_path(path.clone()).unwrap();
        cache.set("abc123".to_string()).unwrap();
        cache.clear().unwrap();

        let reloaded = FileTokenCache::at_path(path).unwrap();
        assert!(reloaded.token().is_none());
    }

    #[test]
    fn test_corrupt_cache_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json").unwrap();

        let cache = FileTokenCache::at_path(path).unwrap();
        assert!(cache.token().is_none());
    }
}
