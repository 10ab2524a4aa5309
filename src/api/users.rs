//! The display-name store: which name each LINE user records expenses under.

use crate::api::files::File;
use crate::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// The name used for users who have not set a display name.
pub const UNSET_NAME: &str = "未設定";

/// Display names keyed by LINE user id, persisted as a JSON object.
///
/// ```json
/// { "U4af4980629...": "太郎" }
/// ```
#[derive(Debug, Clone)]
pub struct UserNames {
    file: File<BTreeMap<String, String>>,
}

impl UserNames {
    /// Loads the store from `path`. A missing file is an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = if path.is_file() {
            File::load(path).await?
        } else {
            debug!("No display names found at {}", path.display());
            File::new(path, BTreeMap::new())
        };
        Ok(Self { file })
    }

    /// The display name of `user_id`, or `UNSET_NAME`.
    pub fn get(&self, user_id: &str) -> &str {
        self.file
            .data()
            .get(user_id)
            .map(String::as_str)
            .unwrap_or(UNSET_NAME)
    }

    /// Sets the display name of `user_id` and saves the store.
    pub async fn set(&mut self, user_id: &str, name: &str) -> Result<()> {
        self.file
            .data_mut()
            .insert(user_id.to_string(), name.to_string());
        self.file.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_and_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_names.json");
        let mut users = UserNames::load(&path).await.unwrap();
        assert_eq!(users.get("U1"), "未設定");

        users.set("U1", "太郎").await.unwrap();
        users.set("U1", "花子").await.unwrap();
        assert_eq!(users.get("U1"), "花子");

        let reloaded = UserNames::load(&path).await.unwrap();
        assert_eq!(reloaded.get("U1"), "花子");
        assert_eq!(reloaded.get("U2"), UNSET_NAME);
    }
}
