//! `commits` commands.

use labctl_api::{CreateCommitOptions, PreparedRequest, project_path};
use labctl_core::{FieldSpec, FlagMapper, TransformId, TransformRegistry};

use super::{Endpoint, Group};
use crate::error::CliError;

pub fn group(registry: &TransformRegistry) -> Result<Group, CliError> {
    let builder = FlagMapper::<CreateCommitOptions>::builder("commits create")
        .flag(
            FieldSpec::string("id")
                .with_short('i')
                .with_description("The ID or URL-encoded path of the project")
                .required(),
        )
        .bind(
            FieldSpec::string("branch")
                .with_short('b')
                .with_description("Branch to commit into; created from --start_branch if missing")
                .required(),
            |o, v| o.branch = Some(v),
        )
        .bind(
            FieldSpec::string("commit_message")
                .with_short('m')
                .with_description("Commit message")
                .required(),
            |o, v| o.commit_message = Some(v),
        )
        .bind(
            FieldSpec::string("start_branch").with_description("Branch to start the new branch from"),
            |o, v| o.start_branch = Some(v),
        )
        .bind(
            FieldSpec::string("actions")
                .with_short('a')
                .with_description(
                    r#"JSON array of actions, e.g. [{"action":"create","file_path":"a.txt","content":"A"}]"#,
                )
                .with_transform(TransformId::CommitActions)
                .required(),
            |o, v| o.actions = Some(v),
        )
        .bind(
            FieldSpec::string("author_email").with_description("Author email"),
            |o, v| o.author_email = Some(v),
        )
        .bind(
            FieldSpec::string("author_name").with_description("Author name"),
            |o, v| o.author_name = Some(v),
        );

    let create = Endpoint::build(
        builder,
        "Create a commit with multiple files and actions",
        |m| {
            let project = project_path(m.require_string("id")?);
            Ok(PreparedRequest::post(format!("{project}/repository/commits")).with_body(m.options())?)
        },
        registry,
    )?;

    Ok(Group::new("commits", "Manage repository commits").leaf(create))
}

#[cfg(test)]
mod tests {
    use clap::Command;
    use labctl_core::{MapError, TransformError};
    use serde_json::json;

    use super::*;

    fn prepare(args: &[&str]) -> Result<PreparedRequest, CliError> {
        let group = group(TransformRegistry::global()).unwrap();
        let argv = ["commits", "create"].into_iter().chain(args.iter().copied());
        let matches = Command::new("commits")
            .subcommands(group.subcommands())
            .try_get_matches_from(argv)
            .unwrap();
        let (action, leaf) = group.find(&matches).unwrap();
        action.prepare(leaf, TransformRegistry::global())
    }

    #[test]
    fn test_actions_are_embedded() {
        let request = prepare(&[
            "-i",
            "7",
            "-b",
            "main",
            "-m",
            "Add readme",
            "-a",
            r#"[{"action":"create","file_path":"README.md","content":"hi"}]"#,
        ])
        .unwrap();
        assert_eq!(request.path, "/projects/7/repository/commits");
        assert_eq!(
            request.body,
            Some(json!({
                "branch": "main",
                "commit_message": "Add readme",
                "actions": [{"action": "create", "file_path": "README.md", "content": "hi"}]
            }))
        );
    }

    #[test]
    fn test_malformed_actions_fail() {
        let err = prepare(&["-i", "7", "-b", "main", "-m", "x", "-a", "[{"]).unwrap_err();
        assert!(matches!(
            err,
            CliError::Map(MapError::Transform {
                source: TransformError::InvalidCommitActions(_),
                ..
            })
        ));
    }
}
