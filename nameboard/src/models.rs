use serde::{Deserialize, Serialize};
use std::fmt;

/// A user as the backend reports it after register, bind or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: u64,
    pub user_id: String,
    pub user_name: String,
    pub tix_name: String,
    pub show_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of `POST /shows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShow {
    pub user_id: String,
    pub user_name: String,
    pub tix_name: String,
    pub show_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_id: Option<u64>,
    #[serde(default)]
    pub author_user_id: Option<String>,
    pub author_name: String,
    pub content: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of `POST /shows/{id}/comments`. `author_user_id` is always sent, as
/// null when no identity is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub author_user_id: Option<String>,
    pub author_name: String,
    pub content: String,
    pub visibility: Visibility,
}

/// Which show column a search matches against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// The owner's `user_name`.
    #[default]
    Owner,
    /// The name printed on the ticket, `tix_name`.
    Tix,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Owner => "owner",
            SearchField::Tix => "tix",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: String,
    pub field: SearchField,
    pub exact: bool,
}

impl SearchQuery {
    /// Query string pairs in the order the backend documents them. `exact` is
    /// forwarded as given; matching semantics belong to the backend.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone()), ("field", self.field.as_str().to_string()), ("exact", self.exact.to_string())]
    }
}

/// Viewer context the backend uses to decide which comments are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentQuery {
    pub viewer_name: Option<String>,
    pub viewer_user_id: Option<String>,
}

impl CommentQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = self.viewer_name.as_deref().filter(|n| !n.is_empty()) {
            pairs.push(("viewer_name", name.to_string()));
        }
        if let Some(id) = self.viewer_user_id.as_deref().filter(|i| !i.is_empty()) {
            pairs.push(("viewer_user_id", id.to_string()));
        }
        pairs
    }
}
