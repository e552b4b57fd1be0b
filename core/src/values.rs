//! Domain values produced by transforms.
//!
//! These are the typed encodings the remote API expects for fields that the
//! command line can only express as plain strings: visibility levels, access
//! levels, label lists and structured commit actions.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Visibility level of a project, group or snippet.
///
/// # Examples
///
/// ```
/// use labctl_core::Visibility;
///
/// assert_eq!("internal".parse::<Visibility>(), Ok(Visibility::Internal));
/// assert!("secret".parse::<Visibility>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Access must be granted explicitly.
    Private,
    /// Visible to any signed-in user.
    Internal,
    /// Visible without authentication.
    Public,
}

impl Visibility {
    /// Returns the wire name of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "internal" => Ok(Self::Internal),
            "public" => Ok(Self::Public),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member permission level.
///
/// Serialized as its numeric level, which is what the API accepts in
/// `group_access` and `access_level` parameters.
///
/// # Examples
///
/// ```
/// use labctl_core::AccessLevel;
///
/// assert_eq!(AccessLevel::from_level(30), Some(AccessLevel::Developer));
/// assert_eq!(AccessLevel::Owner.level(), 50);
/// assert_eq!(AccessLevel::from_level(99), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessLevel {
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
}

impl AccessLevel {
    /// Returns the numeric level (10, 20, 30, 40 or 50).
    pub fn level(&self) -> u8 {
        match self {
            Self::Guest => 10,
            Self::Reporter => 20,
            Self::Developer => 30,
            Self::Maintainer => 40,
            Self::Owner => 50,
        }
    }

    /// Looks up the level for a numeric value.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            10 => Some(Self::Guest),
            20 => Some(Self::Reporter),
            30 => Some(Self::Developer),
            40 => Some(Self::Maintainer),
            50 => Some(Self::Owner),
            _ => None,
        }
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Guest => "guest",
            Self::Reporter => "reporter",
            Self::Developer => "developer",
            Self::Maintainer => "maintainer",
            Self::Owner => "owner",
        };
        write!(f, "{name} ({})", self.level())
    }
}

/// A list of label names.
///
/// The API takes labels as one comma-separated string, so this serializes
/// as `"bug,ui"` rather than as a JSON array.
///
/// # Examples
///
/// ```
/// use labctl_core::Labels;
///
/// let labels = Labels::from(vec!["bug".to_string(), "ui".to_string()]);
/// assert_eq!(serde_json::to_string(&labels).unwrap(), "\"bug,ui\"");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(pub Vec<String>);

impl Labels {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Labels {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.join(","))
    }
}

/// Kind of change a [`CommitAction`] applies to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Create,
    Delete,
    Move,
    Update,
    Chmod,
}

/// One file change inside a multi-file commit.
///
/// # Examples
///
/// ```
/// use labctl_core::{CommitAction, FileAction};
///
/// let raw = r#"{"action":"create","file_path":"README.md","content":"hi"}"#;
/// let action: CommitAction = serde_json::from_str(raw).unwrap();
/// assert_eq!(action.action, FileAction::Create);
/// assert_eq!(action.previous_path, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAction {
    /// What to do with the file.
    pub action: FileAction,
    /// Path of the file the action applies to.
    pub file_path: String,
    /// Original path, for `move` actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    /// New file content, for `create` and `update`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// `text` (default) or `base64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Last known commit id of the file, for optimistic locking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_id: Option<String>,
    /// Whether the executable bit is set, for `chmod`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_filemode: Option<bool>,
}
