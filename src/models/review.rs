use serde::{Deserialize, Serialize};

/// A user-authored text review of a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Millisecond timestamp rendered as a string
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
    /// RFC 3339 creation time
    pub timestamp: String,
}
