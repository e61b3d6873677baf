use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, UserId};

/// Ordering applied to root comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Popularity,
    Oldest,
    #[default]
    Newest,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity",
            SortKey::Oldest => "oldest",
            SortKey::Newest => "newest",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key '{0}', expected one of: popularity, oldest, newest")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popularity" => Ok(SortKey::Popularity),
            "oldest" => Ok(SortKey::Oldest),
            "newest" => Ok(SortKey::Newest),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

/// Settings the host passes to the view-model. Read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewModelOptions {
    pub enable_replying: bool,
    pub enable_editing: bool,
    /// Also makes upvotes count towards popularity.
    pub enable_upvoting: bool,
    pub enable_deleting: bool,
    pub enable_deleting_comment_with_replies: bool,
    pub read_only: bool,
    pub current_user_id: Option<UserId>,
    pub current_user_is_admin: bool,
    pub default_navigation_sort_key: SortKey,
    /// Content that replaces a comment's text when it is deleted.
    pub deleted_comment_text: String,
}

impl Default for ViewModelOptions {
    fn default() -> Self {
        Self {
            enable_replying: true,
            enable_editing: true,
            enable_upvoting: true,
            enable_deleting: true,
            enable_deleting_comment_with_replies: false,
            read_only: false,
            current_user_id: None,
            current_user_is_admin: false,
            default_navigation_sort_key: SortKey::Newest,
            deleted_comment_text: "Deleted".to_string(),
        }
    }
}

impl ViewModelOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ViewModelOptions::default();
        assert!(options.enable_upvoting);
        assert!(options.enable_deleting);
        assert!(!options.enable_deleting_comment_with_replies);
        assert_eq!(options.default_navigation_sort_key, SortKey::Newest);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let options = ViewModelOptions::from_json_str(
            r#"{"enableUpvoting": false, "currentUserId": "u1", "defaultNavigationSortKey": "popularity"}"#,
        )
        .unwrap();

        assert!(!options.enable_upvoting);
        assert!(options.enable_replying);
        assert_eq!(options.current_user_id, Some(UserId::new("u1")));
        assert_eq!(options.default_navigation_sort_key, SortKey::Popularity);
        assert_eq!(options.deleted_comment_text, "Deleted");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = ViewModelOptions::from_json_str("{\"readOnly\": 3}").unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"readOnly": true}"#).unwrap();

        let options = ViewModelOptions::load(&path).unwrap();
        assert!(options.read_only);
        assert!(options.enable_upvoting);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewModelOptions::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("Popularity".parse::<SortKey>().unwrap(), SortKey::Popularity);
        assert_eq!(" oldest ".parse::<SortKey>().unwrap(), SortKey::Oldest);
        assert!("best".parse::<SortKey>().is_err());
        assert_eq!(SortKey::Newest.to_string(), "newest");
    }
}
