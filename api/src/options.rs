//! Request options payloads.
//!
//! One struct per API call. Every field is optional and left out of the
//! serialized form when unset, so a request only carries what the user
//! actually supplied. List endpoints send their options as query
//! parameters, the others as a JSON body (see [`PreparedRequest`]).
//!
//! [`PreparedRequest`]: crate::PreparedRequest

use chrono::{DateTime, NaiveDate, Utc};
use labctl_core::{AccessLevel, CommitAction, Labels, Visibility};
use serde::Serialize;

/// Filters for listing projects (and forks of a project).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListProjectsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_issues_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_merge_requests_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetProjectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<bool>,
}

/// Settings shared by project creation and project edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippets_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_outdated_diff_discussions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_registry_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_jobs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printing_merge_request_link_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_config_path: Option<String>,
}

/// Options types that embed [`ProjectSettings`].
pub trait HasProjectSettings {
    fn settings_mut(&mut self) -> &mut ProjectSettings;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateProjectOptions {
    #[serde(flatten)]
    pub settings: ProjectSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditProjectOptions {
    #[serde(flatten)]
    pub settings: ProjectSettings,
}

impl HasProjectSettings for CreateProjectOptions {
    fn settings_mut(&mut self) -> &mut ProjectSettings {
        &mut self.settings
    }
}

impl HasProjectSettings for EditProjectOptions {
    fn settings_mut(&mut self) -> &mut ProjectSettings {
        &mut self.settings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForkProjectOptions {
    /// ID or path of the target namespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShareWithGroupOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_access: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
}

/// Payload for adding or editing a project hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectHookOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ssl_verification: Option<bool>,
    /// Secret token sent with each hook payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListBranchesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtectBranchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developers_can_push: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developers_can_merge: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateBranchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Branch name or commit SHA to branch from.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListNamespacesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListUsersOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateUserOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extern_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_create_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_confirmation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateIssueOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidential: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_request_to_resolve_discussions_of: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion_to_resolve: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateCommitOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<CommitAction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}
